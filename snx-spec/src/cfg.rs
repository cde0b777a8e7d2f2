//! # Control-Flow Graph
//!
//! Basic blocks over a lowered program. A block starts at PC 0, at every
//! label target and right after every BZ/BAL/HLT. Every PC belongs to
//! exactly one block.
//!
//! Successor edges carry their kind and an explicit target: a block, a PC
//! outside the program, or an indirect jump (BAL through a register).

use crate::diagnostic::{Code, Diagnostics};
use crate::instruction::{BalTarget, IForm, Instruction};
use crate::program::IrProgram;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

/// Index into [`Cfg::blocks`]
pub type BlockId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Fallthrough,
    BranchTaken,
    BranchNotTaken,
    /// BAL to a label
    Call,
    /// Edge from a BAL call to the instruction after it
    ReturnSite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeTarget {
    Block(BlockId),
    /// Target PC outside `0..len`
    Invalid(u32),
    /// BAL through a register
    Indirect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub kind: EdgeKind,
    pub target: EdgeTarget,
}

/// Maximal straight-line PC range `start..=end`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    pub id: BlockId,
    pub start: u32,
    pub end: u32,
    pub successors: Vec<Edge>,
}

impl BasicBlock {
    pub fn pcs(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }

    /// Block ends in HLT or in a BAL through a register
    pub fn is_exit(&self, program: &IrProgram) -> bool {
        match program.get(self.end).map(|ir| &ir.inst) {
            Some(Instruction::R0) => true,
            Some(inst) => inst.is_indirect_jump(),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cfg {
    pub blocks: Vec<BasicBlock>,
    block_of: Vec<BlockId>,
}

impl Cfg {
    /// Block containing PC 0, if the program is not empty
    pub fn entry(&self) -> Option<BlockId> {
        self.block_of.first().copied()
    }

    pub fn block_at(&self, pc: u32) -> Option<BlockId> {
        self.block_of.get(pc as usize).copied()
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Successor blocks of `id` (invalid and indirect targets skipped)
    pub fn successor_blocks(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks[id].successors.iter().filter_map(|e| match e.target {
            EdgeTarget::Block(b) => Some(b),
            _ => None,
        })
    }

    /// Predecessor lists, indexed by block
    pub fn predecessors(&self) -> Vec<Vec<BlockId>> {
        let mut preds = vec![Vec::new(); self.blocks.len()];
        for block in &self.blocks {
            for succ in self.successor_blocks(block.id) {
                if !preds[succ].contains(&block.id) {
                    preds[succ].push(block.id);
                }
            }
        }
        preds
    }

    /// Blocks reachable from the entry block
    pub fn reachable(&self) -> Vec<bool> {
        let mut seen = vec![false; self.blocks.len()];
        let Some(entry) = self.entry() else {
            return seen;
        };
        let mut queue = VecDeque::from([entry]);
        seen[entry] = true;
        while let Some(id) = queue.pop_front() {
            for succ in self.successor_blocks(id) {
                if !seen[succ] {
                    seen[succ] = true;
                    queue.push_back(succ);
                }
            }
        }
        seen
    }

    /// Blocks with at least one path to an exit block
    pub fn reaches_exit(&self, program: &IrProgram) -> Vec<bool> {
        let preds = self.predecessors();
        let mut seen = vec![false; self.blocks.len()];
        let mut queue = VecDeque::new();
        for block in &self.blocks {
            if block.is_exit(program) {
                seen[block.id] = true;
                queue.push_back(block.id);
            }
        }
        while let Some(id) = queue.pop_front() {
            for &pred in &preds[id] {
                if !seen[pred] {
                    seen[pred] = true;
                    queue.push_back(pred);
                }
            }
        }
        seen
    }

    /// Returns of the subroutine entered at `entry`
    ///
    /// Blocks ending in a BAL through a register that `entry` reaches
    /// without following call edges; nested calls are stepped over through
    /// their return-site edge.
    pub fn returns_from(&self, entry: BlockId, program: &IrProgram) -> Vec<BlockId> {
        let mut seen = vec![false; self.blocks.len()];
        let mut returns = Vec::new();
        let mut queue = VecDeque::from([entry]);
        seen[entry] = true;
        while let Some(id) = queue.pop_front() {
            let block = &self.blocks[id];
            if program
                .get(block.end)
                .is_some_and(|ir| ir.inst.is_indirect_jump())
            {
                returns.push(id);
            }
            for edge in &block.successors {
                if edge.kind == EdgeKind::Call {
                    continue;
                }
                if let EdgeTarget::Block(succ) = edge.target {
                    if !seen[succ] {
                        seen[succ] = true;
                        queue.push_back(succ);
                    }
                }
            }
        }
        returns.sort_unstable();
        returns
    }
}

impl fmt::Display for Cfg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            write!(f, "B{} [{}..={}] ->", block.id, block.start, block.end)?;
            for edge in &block.successors {
                match edge.target {
                    EdgeTarget::Block(b) => write!(f, " {:?}:B{}", edge.kind, b)?,
                    EdgeTarget::Invalid(pc) => write!(f, " {:?}:invalid({})", edge.kind, pc)?,
                    EdgeTarget::Indirect => write!(f, " {:?}:indirect", edge.kind)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Build the CFG of a lowered program
pub fn build_cfg(program: &IrProgram) -> Cfg {
    let len = program.len() as u32;
    if len == 0 {
        return Cfg::default();
    }

    let mut starts = BTreeSet::from([0u32]);
    for ir in &program.instructions {
        if let Some(target) = ir.inst.label_target() {
            if target.pc < len {
                starts.insert(target.pc);
            }
        }
        if ir.inst.is_terminator() && ir.pc + 1 < len {
            starts.insert(ir.pc + 1);
        }
    }
    for &pc in program.labels.values() {
        if pc < len {
            starts.insert(pc);
        }
    }

    let starts: Vec<u32> = starts.into_iter().collect();
    let mut blocks = Vec::with_capacity(starts.len());
    let mut block_of = vec![0; len as usize];
    for (id, &start) in starts.iter().enumerate() {
        let end = starts.get(id + 1).map_or(len - 1, |next| next - 1);
        for pc in start..=end {
            block_of[pc as usize] = id;
        }
        blocks.push(BasicBlock {
            id,
            start,
            end,
            successors: Vec::new(),
        });
    }

    let target_of = |pc: u32| {
        if pc < len {
            EdgeTarget::Block(block_of[pc as usize])
        } else {
            EdgeTarget::Invalid(pc)
        }
    };

    for block in &mut blocks {
        let Some(last) = program.get(block.end) else {
            continue;
        };
        let next = target_of(block.end + 1);
        block.successors = match &last.inst {
            Instruction::R0 => Vec::new(),
            Instruction::I(IForm::Bz { target, .. }) => vec![
                Edge {
                    kind: EdgeKind::BranchTaken,
                    target: target_of(target.pc),
                },
                Edge {
                    kind: EdgeKind::BranchNotTaken,
                    target: next,
                },
            ],
            Instruction::I(IForm::Bal { target, .. }) => match target {
                BalTarget::Label(label) => vec![
                    Edge {
                        kind: EdgeKind::Call,
                        target: target_of(label.pc),
                    },
                    Edge {
                        kind: EdgeKind::ReturnSite,
                        target: next,
                    },
                ],
                BalTarget::Address(_) => vec![Edge {
                    kind: EdgeKind::Call,
                    target: EdgeTarget::Indirect,
                }],
            },
            _ => vec![Edge {
                kind: EdgeKind::Fallthrough,
                target: next,
            }],
        };
    }

    Cfg { blocks, block_of }
}

/// Report W001 (unreachable), W002 (no exit path) and W003 (leaves the program)
pub fn check_cfg(cfg: &Cfg, program: &IrProgram, diagnostics: &mut Diagnostics) {
    let reachable = cfg.reachable();
    let reaches_exit = cfg.reaches_exit(program);

    for block in &cfg.blocks {
        let Some(first) = program.get(block.start) else {
            continue;
        };
        let labels = program.labels_at(block.start);
        let at = if labels.is_empty() {
            format!("pc {}", block.start)
        } else {
            format!("label '{}'", labels.join(", "))
        };

        if !reachable[block.id] {
            diagnostics.report(
                Code::W001,
                format!("unreachable code at {}", at),
                first.span,
                first.pc,
            );
        }
        if !reaches_exit[block.id] {
            diagnostics.report(
                Code::W002,
                format!("no path to HLT from {}", at),
                first.span,
                first.pc,
            );
        }

        let Some(last) = program.get(block.end) else {
            continue;
        };
        for edge in &block.successors {
            if let EdgeTarget::Invalid(pc) = edge.target {
                let message = match edge.kind {
                    EdgeKind::BranchTaken | EdgeKind::Call => {
                        format!("branch target pc {} is outside the program", pc)
                    }
                    EdgeKind::Fallthrough | EdgeKind::BranchNotTaken | EdgeKind::ReturnSite => {
                        "control falls off the end of the program".to_string()
                    }
                };
                diagnostics.report(Code::W003, message, last.span, last.pc);
            }
        }
    }
}
