use std::cell::Cell;
use std::num::Wrapping;
use std::thread_local;

/// Generates a random number in `0..n`.
pub(crate) fn random(n: u32) -> u32 {
    thread_local! {
        static RNG: Cell<Wrapping<u32>> = {
            // Seed from the address of a stack slot. Never zero, which
            // xorshift could not recover from.
            let x = 0u8;
            let addr = &x as *const u8 as usize;
            Cell::new(Wrapping((addr as u32) | 1))
        }
    }

    RNG.with(|rng| {
        // 32-bit xorshift.
        let mut x = rng.get();
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        rng.set(x);

        // Lemire's multiply-shift reduction, a cheaper `x % n`.
        ((u64::from(x.0)).wrapping_mul(u64::from(n)) >> 32) as u32
    })
}

/// Visit every slot in `0..len` once, starting from a random position.
///
/// Mergers use this so that inputs which are ready at the same time are
/// picked without bias towards lower slots.
pub(crate) fn rotation(len: usize) -> Rotation {
    let start = if len == 0 {
        0
    } else {
        random(len as u32) as usize
    };
    Rotation {
        len,
        start,
        pos: 0,
    }
}

#[derive(Debug)]
pub(crate) struct Rotation {
    len: usize,
    start: usize,
    pos: usize,
}

impl Iterator for Rotation {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos == self.len {
            return None;
        }
        let index = (self.start + self.pos).wrapping_rem(self.len);
        self.pos += 1;
        Some(index)
    }
}
