//! Interrupt priority and polling latency.

use emu_core::{Bus, FlatRam};
use ricoh_2a03::flags::{B, I, U};
use ricoh_2a03::{Cpu, CpuBus, Registers};

#[derive(Default)]
struct Board {
    ram: FlatRam,
    nmi: bool,
    irq: bool,
    irqs_serviced: u32,
}

impl Bus for Board {
    fn read(&mut self, address: u16) -> u8 {
        self.ram.read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram.write(address, value);
    }
}

impl CpuBus for Board {
    fn poll_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi)
    }

    fn irq_asserted(&self) -> bool {
        self.irq
    }

    fn irq_serviced(&mut self) {
        self.irqs_serviced += 1;
    }
}

fn make_board(program: &[u8]) -> Board {
    let mut board = Board::default();
    board.ram.load(0x8000, program);
    board.ram.poke_word(0xFFFA, 0x9000);
    board.ram.poke_word(0xFFFC, 0x8000);
    board.ram.poke_word(0xFFFE, 0xA000);
    board.ram.poke(0x9000, 0x40); // RTI
    board.ram.load(0xA000, &[0xEA, 0xEA]);
    board
}

fn cpu(interrupt_disable: bool) -> Cpu {
    let mut regs = Registers {
        pc: 0x8000,
        s: 0xFD,
        ..Registers::new()
    };
    if interrupt_disable {
        regs.p.set(I);
    }
    Cpu::with_registers(regs)
}

fn steps(cpu: &mut Cpu, board: &mut Board, n: u32) {
    for _ in 0..n {
        cpu.step(board).expect("step");
    }
}

/// Return address pushed by the last interrupt entry from S = $FD.
fn pushed_pc(board: &Board) -> u16 {
    u16::from_le_bytes([board.ram.peek(0x01FC), board.ram.peek(0x01FD)])
}

#[test]
fn nmi_wins_and_irq_follows_rti() {
    let mut board = make_board(&[0xEA, 0xEA, 0xEA]);
    let mut cpu = crate::cpu(false);
    board.nmi = true;
    board.irq = true;

    // NOP, then the NMI entry.
    steps(&mut cpu, &mut board, 2 + 7);
    assert_eq!(cpu.regs().pc, 0x9000);
    assert!(cpu.regs().p.is_set(I));
    assert_eq!(pushed_pc(&board), 0x8001);
    assert_eq!(board.irqs_serviced, 0);

    // The handler's RTI runs before the IRQ is taken.
    steps(&mut cpu, &mut board, 6);
    assert_eq!(cpu.regs().pc, 0x8001);
    steps(&mut cpu, &mut board, 7);
    assert_eq!(cpu.regs().pc, 0xA000);
    assert_eq!(board.irqs_serviced, 1);
}

#[test]
fn nmi_entry_drops_a_latched_irq() {
    let mut board = make_board(&[0xEA, 0xEA, 0xEA]);
    let mut cpu = crate::cpu(false);
    board.nmi = true;
    board.irq = true;
    steps(&mut cpu, &mut board, 2 + 7);
    assert_eq!(cpu.regs().pc, 0x9000, "first fetch after NMI is the handler");

    // The source is acknowledged inside the handler.
    board.irq = false;
    steps(&mut cpu, &mut board, 6 + 2);
    assert_eq!(cpu.regs().pc, 0x8002);
    assert_eq!(board.irqs_serviced, 0);
}

#[test]
fn only_nmi_pushes_b_clear() {
    let mut board = make_board(&[0xEA, 0xEA]);
    let mut cpu = crate::cpu(false);
    board.irq = true;
    steps(&mut cpu, &mut board, 2 + 7);
    assert_eq!(cpu.regs().pc, 0xA000);
    assert_eq!(board.ram.peek(0x01FB) & (B | U), B | U, "IRQ");

    let mut board = make_board(&[0xEA, 0xEA]);
    let mut cpu = crate::cpu(false);
    board.nmi = true;
    steps(&mut cpu, &mut board, 2 + 7);
    assert_eq!(cpu.regs().pc, 0x9000);
    assert_eq!(board.ram.peek(0x01FB) & (B | U), U, "NMI");

    let mut board = make_board(&[0x00, 0xFF]);
    let mut cpu = crate::cpu(false);
    steps(&mut cpu, &mut board, 7);
    assert_eq!(cpu.regs().pc, 0xA000);
    assert_eq!(pushed_pc(&board), 0x8002, "BRK skips its padding byte");
    assert_eq!(board.ram.peek(0x01FB) & (B | U), B | U, "BRK");
}

#[test]
fn cli_delays_irq_by_one_instruction() {
    // CLI; NOP; NOP
    let mut board = make_board(&[0x58, 0xEA, 0xEA]);
    let mut cpu = crate::cpu(true);
    board.irq = true;
    steps(&mut cpu, &mut board, 2 + 2 + 7);
    assert_eq!(cpu.regs().pc, 0xA000);
    assert_eq!(pushed_pc(&board), 0x8002, "NOP after CLI executed first");
}

#[test]
fn irq_slips_through_sei() {
    // SEI; NOP
    let mut board = make_board(&[0x78, 0xEA]);
    let mut cpu = crate::cpu(false);
    cpu.step(&mut board).expect("fetch SEI");
    board.irq = true;
    steps(&mut cpu, &mut board, 1 + 7);
    assert_eq!(cpu.regs().pc, 0xA000);
    assert_eq!(pushed_pc(&board), 0x8001);
    assert_eq!(board.ram.peek(0x01FB) & I, I, "pushed P already masked");
}

#[test]
fn plp_delays_the_mask_change() {
    // PLP with I clear on the stack, then NOP.
    let mut board = make_board(&[0x28, 0xEA, 0xEA]);
    board.ram.poke(0x01FE, U);
    let mut cpu = crate::cpu(true);
    board.irq = true;
    steps(&mut cpu, &mut board, 4);
    assert!(cpu.regs().p.is_set(I), "I unchanged until the next fetch");
    steps(&mut cpu, &mut board, 2 + 7);
    assert_eq!(cpu.regs().pc, 0xA000);
    // PLP left S at $FE.
    let pushed = u16::from_le_bytes([board.ram.peek(0x01FD), board.ram.peek(0x01FE)]);
    assert_eq!(pushed, 0x8002);
}

#[test]
fn taken_branch_without_page_cross_polls_early() {
    // BNE +0; NOP; NOP
    let mut board = make_board(&[0xD0, 0x00, 0xEA, 0xEA]);
    let mut cpu = crate::cpu(false);
    steps(&mut cpu, &mut board, 2);
    // Raised after the branch's polling cycle.
    board.irq = true;
    steps(&mut cpu, &mut board, 1);
    assert!(cpu.at_instruction_boundary());
    steps(&mut cpu, &mut board, 2 + 7);
    assert_eq!(cpu.regs().pc, 0xA000);
    assert_eq!(pushed_pc(&board), 0x8003, "the NOP ran before the IRQ");
}

#[test]
fn reset_outranks_nmi() {
    let mut board = make_board(&[0xEA, 0xEA]);
    board.ram.poke_word(0xFFFC, 0xC000);
    let mut cpu = crate::cpu(false);
    cpu.step(&mut board).expect("fetch NOP");
    cpu.soft_reset();
    board.nmi = true;
    steps(&mut cpu, &mut board, 1 + 6);
    assert_eq!(cpu.regs().pc, 0xC000);
    assert!(cpu.regs().p.is_set(I));
    assert_eq!(cpu.regs().s, 0xFA);
}
