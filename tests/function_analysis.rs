use n64dasm::{Config, Context, ContextSymbol, Function};

fn make_function(words: &[u32], vram: Option<u32>) -> Function {
    let _ = pretty_env_logger::try_init();
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for word in words {
        bytes.extend_from_slice(&word.to_be_bytes());
    }
    return Function::from_be_bytes(String::from("test_func"), &bytes, 0, vram).unwrap();
}

#[test]
fn full_pipeline_emits_labels_and_reloc_pairs() {
    let words = [
        0x3C01_8010, // lui   $at, 0x8010
        0x2421_0010, // addiu $at, $at, 0x10
        0x1080_0002, // beqz  $a0, .L80000014
        0x0000_0000, //  nop
        0x8C22_0000, // lw    $v0, 0x0($at)
        0x03E0_0008, // jr    $ra
        0x0000_0000, //  nop
    ];
    let mut func = make_function(&words, Some(0x8000_0000));
    let mut ctx = Context::new();
    let cfg = Config::default();

    func.remove_trailing_nops();
    assert_eq!(func.n_instr(), 7);
    func.analyze(&mut ctx, &cfg);

    let text = func.disassemble(&mut ctx, &cfg);
    let expected = "\
glabel test_func
/* 000000 80000000 3C018010 */  lui     $at, %hi(D_80100010)
/* 000004 80000004 24210010 */  addiu   $at, $at, %lo(D_80100010)
/* 000008 80000008 10800002 */  beqz    $a0, .L80000014
/* 00000C 8000000C 00000000 */   nop
/* 000010 80000010 8C220000 */  lw      $v0, 0x0($at)
.L80000014:
/* 000014 80000014 03E00008 */  jr      $ra
/* 000018 80000018 00000000 */   nop
";
    assert_eq!(text, expected);
}

#[test]
fn jump_table_load_renders_with_jtbl_name() {
    let words = [
        0x3C08_8001, // lui   $t0, 0x8001
        0x2508_0000, // addiu $t0, $t0, 0x0
        0x0100_0008, // jr    $t0
        0x0000_0000, //  nop
    ];
    let mut func = make_function(&words, Some(0x8000_0000));
    let mut ctx = Context::new();
    let cfg = Config::default();
    func.analyze(&mut ctx, &cfg);

    assert!(ctx.jump_tables.contains_key(&0x8001_0000));
    let text = func.disassemble(&mut ctx, &cfg);
    assert!(text.contains("%hi(jtbl_80010000)"));
    assert!(text.contains("%lo(jtbl_80010000)"));
    assert!(text.contains("jr      $t0"));
}

#[test]
fn named_constant_renders_through_hi_lo() {
    let words = [
        0x3C01_3F80, // lui $at, 0x3F80
        0x3421_0000, // ori $at, $at, 0x0
    ];
    let mut func = make_function(&words, Some(0x8000_0000));
    let mut ctx = Context::new();
    ctx.add_constant(0x3F80_0000, String::from("FLT_3F800000"));
    let cfg = Config::default();
    func.analyze(&mut ctx, &cfg);

    assert!(func.referenced_constants.contains(&0x3F80_0000));
    let text = func.disassemble(&mut ctx, &cfg);
    assert!(text.contains("%hi(FLT_3F800000)"));
    assert!(text.contains("%lo(FLT_3F800000)"));
}

#[test]
fn unknown_instruction_falls_back_to_data_emission() {
    let words = [
        0x3C01_8010, // lui $at, 0x8010
        0x4C00_0123, // COP3, not a thing on the r4300
    ];
    let mut func = make_function(&words, Some(0x8000_0000));
    let mut ctx = Context::new();
    ctx.symbols.insert(
        0x8000_0004,
        ContextSymbol::autogenerated(0x8000_0004, String::from("D_80000004")),
    );
    let cfg = Config::default();
    func.analyze(&mut ctx, &cfg);
    assert!(func.has_unimplemented_instrs);

    let text = func.disassemble(&mut ctx, &cfg);
    assert!(!text.contains("glabel test_func"));
    assert!(text.contains(".word   0x3C018010"));
    assert!(text.contains(".word   0x4C000123"));
    assert!(text.contains("glabel D_80000004"));
    assert!(ctx.symbols[&0x8000_0004].is_defined);
}

#[test]
fn jal_target_renders_with_known_function_name() {
    let words = [
        0x0C00_0800, // jal 0x80002000
        0x0000_0000, //  nop
    ];
    let mut func = make_function(&words, Some(0x8000_0000));
    let mut ctx = Context::new();
    ctx.add_function(Some(String::from("osInitialize")), 0x8000_2000, String::new());
    let cfg = Config::default();
    func.analyze(&mut ctx, &cfg);

    let text = func.disassemble(&mut ctx, &cfg);
    assert!(text.contains("jal     osInitialize"));
}

#[test]
fn remove_pointers_stabilizes_two_builds() {
    // Same code, different pointer targets: after analysis and pointer
    // removal the two functions must be word-identical.
    let build_a = [0x3C01_8010, 0x2421_0010, 0x03E0_0008, 0x0000_0000];
    let build_b = [0x3C01_8020, 0x2421_0050, 0x03E0_0008, 0x0000_0000];
    let mut func_a = make_function(&build_a, Some(0x8000_0000));
    let mut func_b = make_function(&build_b, Some(0x8000_0000));
    let mut ctx = Context::new();
    let mut cfg = Config::default();
    func_a.analyze(&mut ctx, &cfg);
    func_b.analyze(&mut ctx, &cfg);

    cfg.remove_pointers = true;
    assert_eq!(func_a.count_same_opcode_but_different_arguments(&func_b), 2);
    func_a.remove_pointers(&cfg);
    func_b.remove_pointers(&cfg);
    assert_eq!(func_a.count_same_opcode_but_different_arguments(&func_b), 0);
    assert_eq!(func_a.count_diff_opcodes(&func_b), 0);

    for i in 0..func_a.n_instr() {
        assert_eq!(
            func_a.instructions[i].raw(),
            func_b.instructions[i].raw()
        );
    }
}

#[test]
fn function_without_vram_synthesizes_offset_labels() {
    let words = [
        0x1080_0002, // beqz $a0, +2
        0x0000_0000, //  nop
        0x0000_0000, // nop
        0x2402_0001, // addiu $v0, $zero, 0x1
    ];
    let mut func = make_function(&words, None);
    let mut ctx = Context::new();
    let cfg = Config::default();
    func.analyze(&mut ctx, &cfg);

    assert!(ctx.branch_labels.is_empty());
    let text = func.disassemble(&mut ctx, &cfg);
    assert!(text.contains("beqz    $a0, .L0000C"));
    assert!(text.contains(".L0000C:"));
}
