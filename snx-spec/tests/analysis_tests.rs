//! Whole-program checks on hand-built IR

use snx_spec::{
    check_program, Address, AluOp, BalTarget, Code, Config, ConfigError, IForm, Instruction,
    IrInstruction, IrProgram, LabelRef, Register, SnxError, SourceSpan,
};

fn program(insts: Vec<Instruction>, labels: &[(&str, u32)]) -> IrProgram {
    let mut program = IrProgram::new();
    for (pc, inst) in insts.into_iter().enumerate() {
        let text = inst.to_string();
        let span = SourceSpan::new(pc as u32 + 1, 1, text.len() as u32 + 1);
        program
            .instructions
            .push(IrInstruction::new(pc as u32, inst, text, span));
    }
    for (name, pc) in labels {
        program.labels.insert(IrProgram::label_key(name), *pc);
    }
    program
}

fn codes(program: &IrProgram, config: &Config) -> Vec<Code> {
    check_program(program, config)
        .diagnostics
        .iter()
        .map(|d| d.code)
        .collect()
}

fn lda(dest: Register, imm: i32) -> Instruction {
    Instruction::I(IForm::Lda {
        dest,
        addr: Address::absolute(imm),
    })
}

fn call(link: Register, name: &str, pc: u32) -> Instruction {
    Instruction::I(IForm::Bal {
        link,
        target: BalTarget::Label(LabelRef::new(name, pc)),
    })
}

fn ret(base: Register) -> Instruction {
    Instruction::I(IForm::Bal {
        link: Register::R0,
        target: BalTarget::Address(Address::new(0, base)),
    })
}

#[test]
fn test_call_and_return_is_clean() {
    // main: LDA $1,3 / BAL $2,sub / OUT $1 / HLT / sub: ADD $1,$1,$1 / BAL $0,0($2)
    let p = program(
        vec![
            lda(Register::R1, 3),
            call(Register::R2, "sub", 4),
            Instruction::I(IForm::Out { src: Register::R1 }),
            Instruction::R0,
            Instruction::R {
                op: AluOp::Add,
                dest: Register::R1,
                src1: Register::R1,
                src2: Register::R1,
            },
            ret(Register::R2),
        ],
        &[("main", 0), ("sub", 4)],
    );
    assert_eq!(codes(&p, &Config::DEFAULT), vec![]);
}

#[test]
fn test_literal_address_outside_small_memory() {
    let p = program(
        vec![
            Instruction::I(IForm::Ld {
                dest: Register::R1,
                addr: Address::absolute(127),
            }),
            Instruction::I(IForm::St {
                src: Register::R0,
                addr: Address::absolute(-1),
            }),
            Instruction::R0,
        ],
        &[],
    );
    let small = Config::new(4, 128).unwrap();
    let found = codes(&p, &small);
    assert_eq!(found.iter().filter(|c| **c == Code::M001).count(), 1);
    assert_eq!(found[0], Code::M001);
}

#[test]
fn test_second_return_through_spent_link() {
    // Back at the return site the mark on $2 is spent
    let p = program(
        vec![
            call(Register::R2, "sub", 2),
            ret(Register::R2),
            ret(Register::R2),
        ],
        &[("sub", 2)],
    );
    let out = check_program(&p, &Config::DEFAULT);
    let found: Vec<(Code, Option<u32>)> = out.diagnostics.iter().map(|d| (d.code, d.pc)).collect();
    assert_eq!(found, vec![(Code::C002, Some(1))]);
}

#[test]
fn test_config_rejects_bad_sizes() {
    assert!(matches!(
        Config::new(0, 1024),
        Err(ConfigError::InvalidRegCount(0))
    ));
    assert!(matches!(
        Config::new(4, 100),
        Err(ConfigError::MemSizeNotPowerOfTwo(100))
    ));
    let err: SnxError = ConfigError::InvalidMemSize(0).into();
    assert!(err.to_string().contains("0"));
}

#[test]
fn test_program_bincode_round_trip() {
    let p = program(vec![lda(Register::R1, 5), Instruction::R0], &[("main", 0)]);
    let bytes = p.to_bytes().unwrap();
    let back = IrProgram::from_bytes(&bytes).unwrap();
    assert_eq!(back, p);
    assert_eq!(back.label_pc("MAIN"), Some(0));
}
