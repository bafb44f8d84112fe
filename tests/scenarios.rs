use chip8_vm::{
    Chip8, Chip8Error, Chip8Result, DISPLAY_X, DISPLAY_Y, FONT, FatalReason, Framebuffer,
};

fn load(program: &[u16]) -> Chip8 {
    let rom: Vec<u8> = program.iter().flat_map(|op| op.to_be_bytes()).collect();
    let mut chip8 = Chip8::with_seed(42);
    chip8.load(&rom).unwrap();
    chip8
}

#[test]
fn reset_state_after_load() {
    let chip8 = load(&[0x1200]);

    assert_eq!(chip8.v(), &[0; 16]);
    assert_eq!(chip8.pc(), 0x200);
    assert_eq!(chip8.sp(), -1);
    assert_eq!(chip8.i(), 0);
    assert_eq!(chip8.delay_timer(), 0);
    assert_eq!(chip8.sound_timer(), 0);
    assert!(!chip8.is_paused());
    assert!(!chip8.has_sound());
    assert_eq!(chip8.framebuffer().cells(), &[[0; DISPLAY_X]; DISPLAY_Y]);
    assert_eq!(chip8.keypad().held_mask(), 0);
    assert_eq!(&chip8.memory()[..80], &FONT[..]);
}

#[test]
fn load_then_add() {
    let mut chip8 = Chip8::with_seed(0);
    chip8.load(&[0x60, 0x05, 0x70, 0x03]).unwrap();
    assert_eq!(chip8.speed(), 1);

    chip8.cycle().unwrap();
    chip8.cycle().unwrap();

    assert_eq!(chip8.v()[0], 8);
    assert_eq!(chip8.pc(), 0x204);
}

#[test]
fn set_index() {
    let mut chip8 = Chip8::with_seed(0);
    chip8.load(&[0xA2, 0x34]).unwrap();

    chip8.step().unwrap();

    assert_eq!(chip8.i(), 0x234);
    assert_eq!(chip8.pc(), 0x202);
}

#[test]
fn draw_pixel_twice() {
    let mut fb = Framebuffer::new();
    fb.clear();

    assert!(!fb.draw_pixel(0, 0, 1));
    assert_eq!(fb.cells()[0][0], 1);

    assert!(fb.draw_pixel(0, 0, 1));
    assert_eq!(fb.cells()[0][0], 0);
}

#[test]
fn jump_with_offset_adds_v0_only() {
    let mut chip8 = load(&[0x6010, 0xB200]);

    chip8.step().unwrap();
    chip8.step().unwrap();

    assert_eq!(chip8.pc(), 0x210);
}

#[test]
fn call_with_full_stack_overflows() {
    // 200: call 200, forever
    let mut chip8 = load(&[0x2200]);
    for _ in 0..16 {
        chip8.step().unwrap();
    }
    assert_eq!(chip8.sp(), 15);
    let stack = chip8.stack().to_vec();

    let err = chip8.cycle().unwrap_err();

    assert_eq!(err, Chip8Error::StackOverflow);
    assert_eq!(err.reason(), FatalReason::StackOverflow);
    assert_eq!(chip8.sp(), 15);
    assert_eq!(chip8.stack(), &stack[..]);
    assert_eq!(chip8.pc(), 0x200);
    assert!(chip8.is_paused());
}

#[test]
fn pc_advances_per_category() {
    // (setup, instruction, expected pc after the instruction)
    let cases: &[(&[u16], u16, u16)] = &[
        (&[], 0x00E0, 0x202),
        (&[], 0x0345, 0x345),
        (&[], 0x1456, 0x456),
        (&[], 0x2456, 0x456),
        (&[], 0x3000, 0x204),
        (&[], 0x3001, 0x202),
        (&[], 0x4001, 0x204),
        (&[], 0x4000, 0x202),
        (&[], 0x5010, 0x204),
        (&[0x6101], 0x5010, 0x204),
        (&[], 0x6042, 0x202),
        (&[], 0x7042, 0x202),
        (&[], 0x8014, 0x202),
        (&[], 0x801E, 0x202),
        (&[], 0x9010, 0x202),
        (&[0x6101], 0x9010, 0x206),
        (&[], 0x5127, 0x204),
        (&[0x6101], 0x910F, 0x206),
        (&[], 0xA123, 0x202),
        (&[0x6004], 0xB300, 0x304),
        (&[], 0xC0FF, 0x202),
        (&[], 0xD015, 0x202),
        (&[], 0xE09E, 0x202),
        (&[], 0xE0A1, 0x204),
        (&[], 0xF007, 0x202),
        (&[], 0xF015, 0x202),
        (&[], 0xF018, 0x202),
        (&[], 0xF01E, 0x202),
        (&[], 0xF029, 0x202),
        (&[0xA300], 0xF033, 0x204),
        (&[0xA300], 0xF055, 0x204),
        (&[0xA300], 0xF065, 0x204),
    ];

    for &(setup, op, expected) in cases {
        let mut program = setup.to_vec();
        program.push(op);
        let mut chip8 = load(&program);

        for _ in 0..program.len() {
            assert_eq!(chip8.step(), Ok(Chip8Result::Continue), "{op:04X}");
        }
        assert_eq!(chip8.pc(), expected, "{op:04X}");
    }
}

#[test]
fn wait_for_key_is_the_only_stall() {
    let mut chip8 = load(&[0xF00A]);

    for _ in 0..5 {
        assert_eq!(chip8.cycle(), Ok(Chip8Result::WaitingForKey));
        assert_eq!(chip8.pc(), 0x200);
    }

    chip8.press_key(0x9);
    chip8.release_key(0x9);
    assert_eq!(chip8.cycle(), Ok(Chip8Result::Continue));
    assert_eq!(chip8.v()[0], 0x9);
    assert_eq!(chip8.pc(), 0x202);
}

#[test]
fn drawing_twice_restores_display() {
    // Every glyph, drawn twice at a position that wraps both axes
    for digit in 0..16u16 {
        let mut chip8 = load(&[
            0x603C,
            0x611D,
            0x6200 | digit,
            0xF229,
            0xD015,
            0xD015,
        ]);
        for _ in 0..5 {
            chip8.step().unwrap();
        }
        assert_ne!(chip8.framebuffer().cells(), &[[0; DISPLAY_X]; DISPLAY_Y]);
        assert_eq!(chip8.v()[0xF], 0);

        chip8.step().unwrap();
        assert_eq!(chip8.framebuffer().cells(), &[[0; DISPLAY_X]; DISPLAY_Y]);
        assert_eq!(chip8.v()[0xF], 1);
    }
}

#[test]
fn out_of_bounds_ops_leave_memory_untouched() {
    let cases: &[(u16, u16)] = &[
        (0xAFFE, 0xF033),
        (0xAFF1, 0xFF55),
        (0xAFF1, 0xFF65),
        (0xAFFB, 0xD006),
    ];

    for &(set_index, op) in cases {
        let mut chip8 = load(&[0x60AA, 0x6FBB, set_index, op]);
        for _ in 0..3 {
            chip8.step().unwrap();
        }
        let memory = *chip8.memory();
        let v = *chip8.v();

        let err = chip8.step().unwrap_err();

        assert_eq!(err.reason(), FatalReason::MemoryOutOfBounds, "{op:04X}");
        assert_eq!(chip8.memory(), &memory, "{op:04X}");
        assert_eq!(chip8.v(), &v, "{op:04X}");
        assert!(chip8.is_paused());
    }
}

#[test]
fn unknown_instruction_pauses_until_reload() {
    let mut chip8 = load(&[0xF1FF]);

    assert_eq!(
        chip8.cycle(),
        Err(Chip8Error::UnknownInstruction { opcode: 0xF1FF })
    );
    assert!(chip8.is_paused());
    assert_eq!(chip8.cycle(), Ok(Chip8Result::Paused));

    chip8.load(&[0x60, 0x01]).unwrap();
    assert!(!chip8.is_paused());
    assert_eq!(chip8.cycle(), Ok(Chip8Result::Continue));
    assert_eq!(chip8.v()[0], 1);
}

#[test]
fn sound_follows_sound_timer() {
    let mut chip8 = load(&[0x6002, 0xF018, 0x1204]);

    chip8.cycle().unwrap();
    chip8.cycle().unwrap();
    assert!(chip8.has_sound());

    chip8.cycle().unwrap();
    assert!(chip8.has_sound());
    chip8.cycle().unwrap();
    assert!(!chip8.has_sound());
}
