//! Sprite and sample DMA through the chip's $4014 register.

use emu_core::{Bus, FlatRam};
use ricoh_2a03::flags::I;
use ricoh_2a03::{CoreConfig, Ricoh2A03, SystemBus};

const OAM_DATA: u16 = 0x2004;

#[derive(Default)]
struct Console {
    ram: FlatRam,
    oam: Vec<u8>,
    reads: Vec<u16>,
}

impl Bus for Console {
    fn read(&mut self, address: u16) -> u8 {
        self.reads.push(address);
        self.ram.read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        if address == OAM_DATA {
            self.oam.push(value);
        } else {
            self.ram.write(address, value);
        }
    }
}

impl SystemBus for Console {}

fn sprite_byte(i: u8) -> u8 {
    i ^ 0x5A
}

/// `prefix`, then LDA #$02; STA $4014; NOP.
fn setup(prefix: &[u8]) -> (Ricoh2A03, Console) {
    let mut console = Console::default();
    let mut program = prefix.to_vec();
    program.extend_from_slice(&[0xA9, 0x02, 0x8D, 0x14, 0x40, 0xEA, 0xEA]);
    console.ram.load(0x8000, &program);
    for i in 0..=255u8 {
        console.ram.poke(0x0200 | u16::from(i), sprite_byte(i));
    }
    console.ram.poke(0xC000, 0x77);

    let mut chip = Ricoh2A03::new(CoreConfig {
        power_on_reset: false,
        ..CoreConfig::default()
    });
    let regs = chip.cpu_mut().regs_mut();
    regs.pc = 0x8000;
    regs.s = 0xFD;
    regs.p.set(I);
    (chip, console)
}

fn tick(chip: &mut Ricoh2A03, console: &mut Console, n: u32) {
    for _ in 0..n {
        chip.tick(console).expect("tick");
    }
}

/// Ticks until both transfers are done. A DMC fetch from $C000 is
/// requested after `dmc_after` DMA cycles if given.
fn dma_ticks(chip: &mut Ricoh2A03, console: &mut Console, dmc_after: Option<u32>) -> u32 {
    let mut ticks = 0;
    loop {
        if dmc_after == Some(ticks) {
            chip.request_dmc_dma(0xC000);
        }
        chip.tick(console).expect("tick");
        ticks += 1;
        if !chip.cpu().dma().oam_in_progress() && !chip.dmc_dma_in_progress() {
            return ticks;
        }
        assert!(ticks < 600, "DMA never finished");
    }
}

fn expected_oam() -> Vec<u8> {
    (0..=255).map(sprite_byte).collect()
}

#[test]
fn sta_4014_copies_a_page_in_513_cycles() {
    let (mut chip, mut console) = setup(&[]);
    // LDA #imm (2) + STA abs (4).
    tick(&mut chip, &mut console, 6);
    assert!(chip.cpu().dma().oam_in_progress());
    assert!(!chip.cpu().odd_cycle());

    assert_eq!(dma_ticks(&mut chip, &mut console, None), 513);
    assert_eq!(console.oam, expected_oam());

    // The CPU picks up at the NOP after the store.
    tick(&mut chip, &mut console, 1);
    assert_eq!(chip.cpu().opcode(), 0xEA);
    assert_eq!(chip.cpu().regs().pc, 0x8006);
}

#[test]
fn odd_start_adds_an_alignment_cycle() {
    // LDA $00 (3 cycles) flips the parity of the store.
    let (mut chip, mut console) = setup(&[0xA5, 0x00]);
    tick(&mut chip, &mut console, 3 + 6);
    assert!(chip.cpu().dma().oam_in_progress());
    assert!(chip.cpu().odd_cycle());

    assert_eq!(dma_ticks(&mut chip, &mut console, None), 514);
    assert_eq!(console.oam, expected_oam());
}

/// The store lands on an even cycle with no prefix and on an odd one
/// after LDA $00.
fn start_sprite_dma(odd_start: bool) -> (Ricoh2A03, Console) {
    let prefix: &[u8] = if odd_start { &[0xA5, 0x00] } else { &[] };
    let (mut chip, mut console) = setup(prefix);
    tick(&mut chip, &mut console, if odd_start { 9 } else { 6 });
    assert!(chip.cpu().dma().oam_in_progress());
    assert_eq!(chip.cpu().odd_cycle(), odd_start);
    (chip, console)
}

#[test]
fn dmc_fetch_during_sprite_dma_costs_two_cycles() {
    for (odd_start, plain) in [(false, 513), (true, 514)] {
        for dmc_after in [0, 100, 101, 300] {
            let (mut chip, mut console) = start_sprite_dma(odd_start);
            let shared = dma_ticks(&mut chip, &mut console, Some(dmc_after));
            assert_eq!(
                shared,
                plain + 2,
                "odd start {odd_start}, DMC requested after {dmc_after} cycles"
            );
            assert_eq!(console.oam, expected_oam(), "sprite order intact");
            assert_eq!(console.reads.iter().filter(|&&a| a == 0xC000).count(), 1);
        }
    }
}

#[test]
fn dmc_fetch_at_the_end_of_sprite_dma() {
    // A fetch on the second-to-last put costs one cycle, on the last put
    // three.
    let cases = [
        (false, 509, 513 + 1),
        (false, 511, 513 + 3),
        (true, 510, 514 + 1),
        (true, 512, 514 + 3),
    ];
    for (odd_start, dmc_after, total) in cases {
        let (mut chip, mut console) = start_sprite_dma(odd_start);
        let shared = dma_ticks(&mut chip, &mut console, Some(dmc_after));
        assert_eq!(
            shared, total,
            "odd start {odd_start}, DMC requested after {dmc_after} cycles"
        );
        assert_eq!(console.oam, expected_oam());
        assert_eq!(console.reads.iter().filter(|&&a| a == 0xC000).count(), 1);
    }
}

#[test]
fn dmc_fetch_halts_the_cpu_for_four_cycles() {
    let (mut chip, mut console) = setup(&[]);
    // Request on an even cycle so the first halt attempt lands on an odd one.
    tick(&mut chip, &mut console, 2);
    assert!(!chip.cpu().odd_cycle());
    chip.request_dmc_dma(0xC000);
    let mut ticks = 0;
    while chip.dmc_dma_in_progress() {
        chip.tick(&mut console).expect("tick");
        ticks += 1;
        assert!(ticks < 10);
    }
    assert_eq!(ticks, 4);
    assert_eq!(console.reads.iter().filter(|&&a| a == 0xC000).count(), 1);
    // The stalled fetch of STA then runs normally.
    tick(&mut chip, &mut console, 1);
    assert_eq!(chip.cpu().opcode(), 0x8D);
}
