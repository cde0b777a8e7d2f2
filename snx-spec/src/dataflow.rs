//! # Dataflow Analysis
//!
//! Forward worklist fixed point over the CFG tracking, per block entry:
//! - the initialization state of every register and every absolute memory cell
//! - whether a register holds a return address produced by BAL
//! - which memory slots hold a spilled return address
//!
//! A slot is either an absolute cell (base `$0`) or an offset from the stack
//! pointer `$3`. Stack offsets follow `LDA $3, k($3)`; any other write to
//! `$3` forgets them. Stores through other bases are not tracked.
//!
//! Calls are stepped over: the fact at a return site combines the caller's
//! fact after the BAL with the joined exit facts of the callee's returns.
//! The callee is assumed to leave the caller's stack frame intact.
//!
//! The fixed point runs silently; diagnostics come from one reporting pass
//! over the converged block entry facts, so each read is reported once.

use crate::cfg::{BasicBlock, BlockId, Cfg, Edge, EdgeKind, EdgeTarget};
use crate::config::Config;
use crate::diagnostic::{Code, Diagnostics};
use crate::instruction::{Address, IForm, Instruction};
use crate::program::{IrInstruction, IrProgram};
use crate::register::Register;
use crate::word::{effective_address, sign_extend_8};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::debug;

/// Stack pointer by calling convention
pub const STACK_POINTER: Register = Register::R3;

/// Initialization lattice: `Uninit` and `Init` join to `Maybe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitState {
    Uninit,
    Maybe,
    Init,
}

impl InitState {
    #[inline]
    pub fn join(self, other: InitState) -> InitState {
        if self == other {
            self
        } else {
            InitState::Maybe
        }
    }

    /// State after a call: initialized if either the caller or the callee did it
    #[inline]
    pub fn after_call(self, callee: InitState) -> InitState {
        match (self, callee) {
            (InitState::Init, _) | (_, InitState::Init) => InitState::Init,
            (InitState::Uninit, InitState::Uninit) => InitState::Uninit,
            _ => InitState::Maybe,
        }
    }
}

/// Memory location the analysis can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    /// Cell addressed through `$0`
    Absolute(u16),
    /// Offset from the current value of `$3`
    Stack(i32),
}

impl Slot {
    pub fn of(addr: &Address) -> Option<Slot> {
        if addr.is_absolute() {
            Some(Slot::Absolute(effective_address(0, addr.imm)))
        } else if addr.base == STACK_POINTER {
            Some(Slot::Stack(sign_extend_8(addr.imm)))
        } else {
            None
        }
    }
}

/// Abstract machine state at a program point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub registers: Vec<InitState>,
    /// Register holds a return address on every path
    pub return_address: Vec<bool>,
    /// Absolute cells; a missing cell is `Uninit`
    pub memory: BTreeMap<u16, InitState>,
    /// Slots holding a return address on every path
    pub return_slots: BTreeSet<Slot>,
}

impl Fact {
    /// State at PC 0: `$0` reads as zero, everything else uninitialized
    pub fn entry(reg_count: u8) -> Self {
        let mut registers = vec![InitState::Uninit; reg_count as usize];
        if let Some(r0) = registers.first_mut() {
            *r0 = InitState::Init;
        }
        Self {
            registers,
            return_address: vec![false; reg_count as usize],
            memory: BTreeMap::new(),
            return_slots: BTreeSet::new(),
        }
    }

    pub fn register(&self, reg: Register) -> InitState {
        self.registers
            .get(reg.index())
            .copied()
            .unwrap_or(InitState::Uninit)
    }

    pub fn holds_return_address(&self, reg: Register) -> bool {
        self.return_address.get(reg.index()).copied().unwrap_or(false)
    }

    pub fn cell(&self, address: u16) -> InitState {
        self.memory
            .get(&address)
            .copied()
            .unwrap_or(InitState::Uninit)
    }

    pub fn slot_holds_return_address(&self, slot: Slot) -> bool {
        self.return_slots.contains(&slot)
    }

    /// Pointwise join; return-address flags survive only if set on both sides
    pub fn join(&self, other: &Fact) -> Fact {
        let registers = self
            .registers
            .iter()
            .zip(&other.registers)
            .map(|(a, b)| a.join(*b))
            .collect();
        let return_address = self
            .return_address
            .iter()
            .zip(&other.return_address)
            .map(|(a, b)| *a && *b)
            .collect();

        let mut memory = BTreeMap::new();
        for &address in self.memory.keys().chain(other.memory.keys()) {
            memory
                .entry(address)
                .or_insert_with(|| self.cell(address).join(other.cell(address)));
        }

        Fact {
            registers,
            return_address,
            memory,
            return_slots: self
                .return_slots
                .intersection(&other.return_slots)
                .copied()
                .collect(),
        }
    }

    /// Fact at the return site of a call
    ///
    /// `self` is the caller just after the BAL and `exit` the callee's
    /// returns joined. Register marks and absolute slots come from the
    /// callee, stack slots from the caller. `link` loses its mark.
    pub fn return_from(&self, exit: &Fact, link: Option<Register>) -> Fact {
        let registers = self
            .registers
            .iter()
            .zip(&exit.registers)
            .map(|(a, b)| a.after_call(*b))
            .collect();

        let mut memory = BTreeMap::new();
        for &address in self.memory.keys().chain(exit.memory.keys()) {
            memory
                .entry(address)
                .or_insert_with(|| self.cell(address).after_call(exit.cell(address)));
        }

        let absolute = exit
            .return_slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Absolute(_)));
        let stack = self
            .return_slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Stack(_)));

        let mut fact = Fact {
            registers,
            return_address: exit.return_address.clone(),
            memory,
            return_slots: absolute.chain(stack).copied().collect(),
        };
        if let Some(link) = link {
            fact.clear_return_address(link);
        }
        fact
    }

    fn write_register(&mut self, reg: Register, holds_return_address: bool) {
        if let Some(state) = self.registers.get_mut(reg.index()) {
            *state = InitState::Init;
        }
        if let Some(flag) = self.return_address.get_mut(reg.index()) {
            *flag = holds_return_address;
        }
    }

    fn clear_return_address(&mut self, reg: Register) {
        if let Some(flag) = self.return_address.get_mut(reg.index()) {
            *flag = false;
        }
    }

    fn store_return_address(&mut self, slot: Slot, holds_return_address: bool) {
        if holds_return_address {
            self.return_slots.insert(slot);
        } else {
            self.return_slots.remove(&slot);
        }
    }

    /// `$3` moved by `delta`: rebase stack slots on the new value
    fn shift_stack(&mut self, delta: i32) {
        self.return_slots = self
            .return_slots
            .iter()
            .map(|slot| match *slot {
                Slot::Stack(offset) => Slot::Stack(offset - delta),
                absolute => absolute,
            })
            .collect();
    }

    fn forget_stack(&mut self) {
        self.return_slots
            .retain(|slot| matches!(slot, Slot::Absolute(_)));
    }
}

/// Converged block entry facts (`None` for blocks never reached)
#[derive(Debug, Clone)]
pub struct DataflowResult {
    pub block_in: Vec<Option<Fact>>,
    pub iterations: usize,
}

impl DataflowResult {
    pub fn fact_at_block(&self, id: BlockId) -> Option<&Fact> {
        self.block_in.get(id).and_then(Option::as_ref)
    }
}

/// Apply one instruction to `fact`, reporting reads into `sink` when given
pub fn transfer(
    ir: &IrInstruction,
    fact: &mut Fact,
    config: &Config,
    mut sink: Option<&mut Diagnostics>,
) {
    let mut report = |code: Code, message: String| {
        if let Some(diagnostics) = sink.as_deref_mut() {
            diagnostics.report(code, message, ir.span, ir.pc);
        }
    };

    let mut reads = ir.inst.reads();
    reads.dedup();
    for reg in reads {
        match fact.register(reg) {
            InitState::Uninit => {
                report(Code::D001, format!("read of uninitialized register {}", reg))
            }
            InitState::Maybe => report(
                Code::D002,
                format!("register {} may be uninitialized here", reg),
            ),
            InitState::Init => {}
        }
    }

    match &ir.inst {
        Instruction::I(IForm::Ld { dest, addr }) => {
            let slot = Slot::of(addr);
            if let Some(Slot::Absolute(cell)) = slot {
                if config.in_memory(cell as u32) {
                    match fact.cell(cell) {
                        InitState::Uninit => report(
                            Code::D003,
                            format!("read of uninitialized memory cell {}", cell),
                        ),
                        InitState::Maybe => report(
                            Code::D004,
                            format!("memory cell {} may be uninitialized here", cell),
                        ),
                        InitState::Init => {}
                    }
                }
            }
            let restored = slot.is_some_and(|slot| fact.slot_holds_return_address(slot));
            fact.write_register(*dest, restored);
        }
        Instruction::I(IForm::St { src, addr }) => match Slot::of(addr) {
            Some(Slot::Absolute(cell)) if !config.in_memory(cell as u32) => {}
            Some(slot) => {
                if let Slot::Absolute(cell) = slot {
                    fact.memory.insert(cell, InitState::Init);
                }
                let spilled = fact.holds_return_address(*src);
                fact.store_return_address(slot, spilled);
            }
            None => {}
        },
        Instruction::I(IForm::Bal { link, .. }) => {
            if let Some(addr) = ir.inst.address() {
                let base = addr.base;
                if base.is_zero() {
                    report(
                        Code::C002,
                        format!("return through {}, which never holds a return address", base),
                    );
                } else if !fact.holds_return_address(base) {
                    report(
                        Code::C002,
                        format!("return through {} without a valid return address", base),
                    );
                }
            }
            fact.write_register(*link, true);
        }
        inst => {
            if let Some(dest) = inst.writes() {
                fact.write_register(dest, false);
            }
        }
    }

    if ir.inst.writes() == Some(STACK_POINTER) {
        match &ir.inst {
            Instruction::I(IForm::Lda { addr, .. }) if addr.base == STACK_POINTER => {
                fact.shift_stack(sign_extend_8(addr.imm))
            }
            _ => fact.forget_stack(),
        }
    }
}

fn transfer_block(
    program: &IrProgram,
    block: &BasicBlock,
    input: &Fact,
    config: &Config,
    mut sink: Option<&mut Diagnostics>,
) -> Fact {
    let mut fact = input.clone();
    for pc in block.pcs() {
        if let Some(ir) = program.get(pc) {
            transfer(ir, &mut fact, config, sink.as_deref_mut());
        }
    }
    fact
}

/// Call blocks paired with the returns of the subroutines they call
struct CallSites {
    /// Per block ending in a BAL to a label: the callee's return blocks
    returns: Vec<Vec<BlockId>>,
    /// Per return block: the call blocks whose return site it feeds
    callers: Vec<Vec<BlockId>>,
}

impl CallSites {
    fn new(program: &IrProgram, cfg: &Cfg) -> Self {
        let mut returns = vec![Vec::new(); cfg.len()];
        let mut callers = vec![Vec::new(); cfg.len()];
        let mut by_callee: BTreeMap<BlockId, Vec<BlockId>> = BTreeMap::new();

        for block in &cfg.blocks {
            let callee = block.successors.iter().find_map(|edge| match edge {
                Edge {
                    kind: EdgeKind::Call,
                    target: EdgeTarget::Block(callee),
                } => Some(*callee),
                _ => None,
            });
            let Some(callee) = callee else {
                continue;
            };
            let exits = by_callee
                .entry(callee)
                .or_insert_with(|| cfg.returns_from(callee, program));
            for &exit in exits.iter() {
                callers[exit].push(block.id);
            }
            returns[block.id] = exits.clone();
        }

        Self { returns, callers }
    }

    /// Joined exit facts of the returns reached so far
    fn callee_exit(&self, call: BlockId, block_out: &[Option<Fact>]) -> Option<Fact> {
        self.returns[call]
            .iter()
            .filter_map(|&id| block_out[id].as_ref())
            .fold(None, |acc: Option<Fact>, exit| match acc {
                Some(joined) => Some(exit.join(&joined)),
                None => Some(exit.clone()),
            })
    }
}

fn enqueue(worklist: &mut VecDeque<BlockId>, queued: &mut [bool], id: BlockId) {
    if !queued[id] {
        queued[id] = true;
        worklist.push_back(id);
    }
}

/// Run the worklist to a fixed point
pub fn solve(program: &IrProgram, cfg: &Cfg, config: &Config) -> DataflowResult {
    let mut block_in: Vec<Option<Fact>> = vec![None; cfg.len()];
    let mut iterations = 0;
    let Some(entry) = cfg.entry() else {
        return DataflowResult {
            block_in,
            iterations,
        };
    };

    let calls = CallSites::new(program, cfg);
    let mut block_out: Vec<Option<Fact>> = vec![None; cfg.len()];
    block_in[entry] = Some(Fact::entry(config.reg_count));
    let mut queued = vec![false; cfg.len()];
    let mut worklist = VecDeque::new();
    enqueue(&mut worklist, &mut queued, entry);

    while let Some(id) = worklist.pop_front() {
        queued[id] = false;
        iterations += 1;
        let Some(input) = block_in[id].clone() else {
            continue;
        };
        let block = cfg.block(id);
        let out = transfer_block(program, block, &input, config, None);
        if block_out[id].as_ref() != Some(&out) {
            block_out[id] = Some(out.clone());
            for &caller in &calls.callers[id] {
                enqueue(&mut worklist, &mut queued, caller);
            }
        }

        for edge in &block.successors {
            let EdgeTarget::Block(succ) = edge.target else {
                continue;
            };
            let incoming = if edge.kind == EdgeKind::ReturnSite {
                // nothing flows past the call until the callee returns
                let Some(exit) = calls.callee_exit(id, &block_out) else {
                    continue;
                };
                let link = program.get(block.end).and_then(|ir| ir.inst.writes());
                out.return_from(&exit, link)
            } else {
                out.clone()
            };
            let merged = match &block_in[succ] {
                Some(old) => old.join(&incoming),
                None => incoming,
            };
            if block_in[succ].as_ref() != Some(&merged) {
                block_in[succ] = Some(merged);
                enqueue(&mut worklist, &mut queued, succ);
            }
        }
    }

    debug!(blocks = cfg.len(), iterations, "dataflow converged");
    DataflowResult {
        block_in,
        iterations,
    }
}

/// Solve, then report D001-D004 and C002 in PC order
pub fn check_dataflow(
    program: &IrProgram,
    cfg: &Cfg,
    config: &Config,
    diagnostics: &mut Diagnostics,
) -> DataflowResult {
    let result = solve(program, cfg, config);
    for block in &cfg.blocks {
        if let Some(input) = result.fact_at_block(block.id) {
            transfer_block(program, block, input, config, Some(diagnostics));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::build_cfg;
    use crate::diagnostic::SourceSpan;
    use crate::instruction::{Address, AluOp, BalTarget, LabelRef};

    fn program_of(insts: Vec<Instruction>) -> IrProgram {
        let mut program = IrProgram::new();
        for (pc, inst) in insts.into_iter().enumerate() {
            if let Some(target) = inst.label_target() {
                program
                    .labels
                    .insert(IrProgram::label_key(&target.name), target.pc);
            }
            let text = inst.to_string();
            program.instructions.push(IrInstruction::new(
                pc as u32,
                inst,
                text,
                SourceSpan::new(pc as u32 + 1, 1, 2),
            ));
        }
        program
    }

    fn run(program: &IrProgram) -> Vec<(Code, u32)> {
        let cfg = build_cfg(program);
        let mut diags = Diagnostics::new();
        check_dataflow(program, &cfg, &Config::DEFAULT, &mut diags);
        diags
            .iter()
            .map(|d| (d.code, d.pc.unwrap_or(u32::MAX)))
            .collect()
    }

    fn r(n: u8) -> Register {
        Register::new(n)
    }

    fn add(dest: u8, a: u8, b: u8) -> Instruction {
        Instruction::R {
            op: AluOp::Add,
            dest: r(dest),
            src1: r(a),
            src2: r(b),
        }
    }

    fn lda(dest: u8, imm: i32) -> Instruction {
        Instruction::I(IForm::Lda {
            dest: r(dest),
            addr: Address::absolute(imm),
        })
    }

    fn lda_from(dest: u8, imm: i32, base: u8) -> Instruction {
        Instruction::I(IForm::Lda {
            dest: r(dest),
            addr: Address::new(imm, r(base)),
        })
    }

    fn ld(dest: u8, imm: i32, base: u8) -> Instruction {
        Instruction::I(IForm::Ld {
            dest: r(dest),
            addr: Address::new(imm, r(base)),
        })
    }

    fn st(src: u8, imm: i32, base: u8) -> Instruction {
        Instruction::I(IForm::St {
            src: r(src),
            addr: Address::new(imm, r(base)),
        })
    }

    fn bz(cond: u8, name: &str, pc: u32) -> Instruction {
        Instruction::I(IForm::Bz {
            cond: r(cond),
            target: LabelRef::new(name, pc),
        })
    }

    fn call(link: u8, name: &str, pc: u32) -> Instruction {
        Instruction::I(IForm::Bal {
            link: r(link),
            target: BalTarget::Label(LabelRef::new(name, pc)),
        })
    }

    fn ret(link: u8, base: u8) -> Instruction {
        Instruction::I(IForm::Bal {
            link: r(link),
            target: BalTarget::Address(Address::new(0, r(base))),
        })
    }

    #[test]
    fn test_join_table() {
        use InitState::*;
        assert_eq!(Init.join(Init), Init);
        assert_eq!(Uninit.join(Uninit), Uninit);
        assert_eq!(Init.join(Uninit), Maybe);
        assert_eq!(Uninit.join(Maybe), Maybe);
        assert_eq!(Maybe.join(Init), Maybe);
    }

    #[test]
    fn test_fact_join() {
        let mut a = Fact::entry(4);
        let mut b = Fact::entry(4);
        a.write_register(r(1), true);
        b.write_register(r(1), false);
        a.memory.insert(3, InitState::Init);
        let j = a.join(&b);
        assert_eq!(j.register(r(0)), InitState::Init);
        assert_eq!(j.register(r(1)), InitState::Init);
        assert_eq!(j.register(r(2)), InitState::Uninit);
        assert!(!j.holds_return_address(r(1)));
        assert_eq!(j.cell(3), InitState::Maybe);
        assert_eq!(j.cell(4), InitState::Uninit);
        assert_eq!(j.join(&j), j);
    }

    #[test]
    fn test_uninitialized_register_read() {
        let program = program_of(vec![add(1, 2, 3), Instruction::R0]);
        assert_eq!(run(&program), vec![(Code::D001, 0), (Code::D001, 0)]);
    }

    #[test]
    fn test_register_zero_is_initialized() {
        let program = program_of(vec![add(1, 0, 0), add(2, 1, 0), Instruction::R0]);
        assert!(run(&program).is_empty());
    }

    #[test]
    fn test_maybe_initialized_register() {
        // 0: IN $1; 1: BZ $1, skip; 2: LDA $2, 1($0); 3: skip: OUT $2; 4: HLT
        let program = program_of(vec![
            Instruction::I(IForm::In { dest: r(1) }),
            bz(1, "skip", 3),
            lda(2, 1),
            Instruction::I(IForm::Out { src: r(2) }),
            Instruction::R0,
        ]);
        assert_eq!(run(&program), vec![(Code::D002, 3)]);
    }

    #[test]
    fn test_loop_converges() {
        // 0: LDA $1, 3($0); 1: loop: ADD $2, $1, $0; 2: BZ $2, loop; 3: HLT
        let program = program_of(vec![lda(1, 3), add(2, 1, 0), bz(2, "loop", 1), Instruction::R0]);
        let cfg = build_cfg(&program);
        let result = solve(&program, &cfg, &Config::DEFAULT);
        assert!(result.iterations >= 2);
        assert!(run(&program).is_empty());
    }

    #[test]
    fn test_memory_cells() {
        let st = |imm| {
            Instruction::I(IForm::St {
                src: r(0),
                addr: Address::absolute(imm),
            })
        };
        let ld = |imm| {
            Instruction::I(IForm::Ld {
                dest: r(1),
                addr: Address::absolute(imm),
            })
        };
        let program = program_of(vec![st(5), ld(5), ld(6), Instruction::R0]);
        assert_eq!(run(&program), vec![(Code::D003, 2)]);
    }

    #[test]
    fn test_call_and_return() {
        // 0: main: BAL $2, sub; 1: HLT; 2: sub: BAL $3, 0($2)
        let program = program_of(vec![call(2, "sub", 2), Instruction::R0, ret(3, 2)]);
        assert!(run(&program).is_empty());
    }

    #[test]
    fn test_second_return_without_fresh_call() {
        // 0: main: BAL $2, sub; 1: BAL $3, 0($2); 2: sub: BAL $3, 0($2)
        let program = program_of(vec![call(2, "sub", 2), ret(3, 2), ret(3, 2)]);
        assert_eq!(run(&program), vec![(Code::C002, 1)]);
    }

    #[test]
    fn test_return_through_data_register() {
        let program = program_of(vec![lda(2, 4), ret(3, 2)]);
        assert_eq!(run(&program), vec![(Code::C002, 1)]);
    }

    #[test]
    fn test_return_through_uninitialized_register() {
        let program = program_of(vec![ret(3, 2)]);
        assert_eq!(run(&program), vec![(Code::D001, 0), (Code::C002, 0)]);
    }

    #[test]
    fn test_return_through_maybe_initialized_register() {
        // 0: IN $1; 1: BZ $1, skip; 2: LDA $2, 1($0); 3: skip: BAL $0, 0($2)
        let program = program_of(vec![
            Instruction::I(IForm::In { dest: r(1) }),
            bz(1, "skip", 3),
            lda(2, 1),
            ret(0, 2),
        ]);
        assert_eq!(run(&program), vec![(Code::D002, 3), (Code::C002, 3)]);
    }

    #[test]
    fn test_return_address_spilled_to_absolute_cell() {
        // 0: BAL $2, sub; 1: HLT
        // 2: sub: ST $2, 20($0); 3: LDA $2, 0($0); 4: LD $2, 20($0); 5: BAL $0, 0($2)
        let program = program_of(vec![
            call(2, "sub", 2),
            Instruction::R0,
            st(2, 20, 0),
            lda(2, 0),
            ld(2, 20, 0),
            ret(0, 2),
        ]);
        assert!(run(&program).is_empty());
    }

    #[test]
    fn test_return_through_value_loaded_from_memory() {
        // 0: LDA $1, 5($0); 1: ST $1, 0($0); 2: LD $2, 0($0); 3: BAL $0, 0($2)
        let program = program_of(vec![lda(1, 5), st(1, 0, 0), ld(2, 0, 0), ret(0, 2)]);
        assert_eq!(run(&program), vec![(Code::C002, 3)]);
    }

    /// Frame of two slots below `$3`: return address above, data below
    fn framed_call(restore_offset: i32) -> IrProgram {
        program_of(vec![
            lda(3, 100),
            call(2, "sub", 3),
            Instruction::R0,
            lda_from(3, -2, 3),
            st(2, 1, 3),
            st(0, 0, 3),
            lda_from(3, 1, 3),
            ld(2, restore_offset, 3),
            lda_from(3, 1, 3),
            ret(0, 2),
        ])
    }

    #[test]
    fn test_stack_slots_follow_stack_pointer() {
        assert!(run(&framed_call(0)).is_empty());
        assert_eq!(run(&framed_call(-1)), vec![(Code::C002, 9)]);
    }

    #[test]
    fn test_other_write_to_stack_pointer_forgets_slots() {
        // 0: LDA $3, 100($0); 1: BAL $2, sub; 2: HLT
        // 3: sub: ST $2, 0($3); 4: LDA $3, 100($0); 5: LD $2, 0($3); 6: BAL $0, 0($2)
        let program = program_of(vec![
            lda(3, 100),
            call(2, "sub", 3),
            Instruction::R0,
            st(2, 0, 3),
            lda(3, 100),
            ld(2, 0, 3),
            ret(0, 2),
        ]);
        assert_eq!(run(&program), vec![(Code::C002, 6)]);
    }

    #[test]
    fn test_value_returned_by_callee() {
        // 0: BAL $2, sub; 1: OUT $1; 2: HLT; 3: sub: LDA $1, 5($0); 4: BAL $0, 0($2)
        let program = program_of(vec![
            call(2, "sub", 3),
            Instruction::I(IForm::Out { src: r(1) }),
            Instruction::R0,
            lda(1, 5),
            ret(0, 2),
        ]);
        assert!(run(&program).is_empty());
    }

    #[test]
    fn test_value_returned_on_one_path_only() {
        // 0: BAL $2, sub; 1: OUT $1; 2: HLT
        // 3: sub: BZ $0, early; 4: LDA $1, 5($0); 5: BAL $0, 0($2); 6: early: BAL $0, 0($2)
        let program = program_of(vec![
            call(2, "sub", 3),
            Instruction::I(IForm::Out { src: r(1) }),
            Instruction::R0,
            bz(0, "early", 6),
            lda(1, 5),
            ret(0, 2),
            ret(0, 2),
        ]);
        assert_eq!(run(&program), vec![(Code::D002, 1)]);
    }

    #[test]
    fn test_return_site_fact() {
        let mut caller = Fact::entry(4);
        caller.write_register(r(1), false);
        caller.return_slots.insert(Slot::Stack(0));
        caller.return_slots.insert(Slot::Absolute(9));

        let mut exit = Fact::entry(4);
        exit.write_register(r(2), true);
        exit.write_register(r(3), true);
        exit.return_slots.insert(Slot::Stack(5));
        exit.return_slots.insert(Slot::Absolute(7));

        let fact = caller.return_from(&exit, Some(r(2)));
        assert!(fact.registers.iter().all(|s| *s == InitState::Init));
        assert!(!fact.holds_return_address(r(2)));
        assert!(fact.holds_return_address(r(3)));
        assert_eq!(
            fact.return_slots,
            BTreeSet::from([Slot::Absolute(7), Slot::Stack(0)])
        );
    }

    #[test]
    fn test_after_call_table() {
        use InitState::*;
        assert_eq!(Uninit.after_call(Init), Init);
        assert_eq!(Init.after_call(Uninit), Init);
        assert_eq!(Uninit.after_call(Uninit), Uninit);
        assert_eq!(Maybe.after_call(Uninit), Maybe);
        assert_eq!(Uninit.after_call(Maybe), Maybe);
    }

    #[test]
    fn test_unreached_blocks_are_not_reported() {
        let program = program_of(vec![Instruction::R0, add(1, 2, 3), Instruction::R0]);
        assert!(run(&program).is_empty());
    }
}
