// src/rng.rs
//! Детерминированный генератор случайных чисел
//!
//! Все процедурные подсистемы (рельеф, ресурсы, ландшафт, летопись) берут случайность
//! только отсюда. Генератор — классический 32-битный xorshift, засеянный хэшем FNV-1a
//! от строки `"<seed>|<tag>"`. Тег задаёт назначение потока: один и тот же сид мира
//! даёт независимые, но воспроизводимые последовательности для разных подсистем.
//!
//! Хэш и шаг xorshift фиксированы бит-в-бит — на них завязаны golden-тесты.

use rand::{Error, RngCore, SeedableRng};

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Замена нулевого состояния: xorshift из нуля никогда не выходит.
const ZERO_STATE_REPLACEMENT: u32 = 0x9e37_79b9;

/// 32-битный FNV-1a по байтам UTF-8 строки.
#[must_use]
pub fn fnv1a32(input: &str) -> u32 {
    input.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Сид потока для подсистемы: хэш от `"<seed>|<tag>"`.
#[must_use]
pub fn tagged_seed(seed: &str, tag: &str) -> u32 {
    fnv1a32(&format!("{seed}|{tag}"))
}

/// Генератор xorshift32.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    #[must_use]
    pub fn new(seed: u32) -> Self {
        let state = if seed == 0 {
            ZERO_STATE_REPLACEMENT
        } else {
            seed
        };
        Self { state }
    }

    /// Поток для конкретной подсистемы (например, `"worldLoreV8"`).
    #[must_use]
    pub fn for_purpose(seed: &str, tag: &str) -> Self {
        Self::new(tagged_seed(seed, tag))
    }

    /// Один шаг xorshift (13, 17, 5).
    pub fn next_state(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Число из `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_state()) / 4_294_967_296.0
    }

    /// `true` с вероятностью `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Целое из полуинтервала `[lo, hi)`; при пустом интервале возвращает `lo`.
    pub fn range(&mut self, lo: usize, hi: usize) -> usize {
        if hi <= lo {
            return lo;
        }
        lo + (self.next_f64() * (hi - lo) as f64) as usize
    }

    /// Целое из отрезка `[lo, hi]`.
    pub fn range_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        let span = u64::from(hi - lo) + 1;
        lo + (self.next_f64() * span as f64) as u32
    }

    /// Случайный элемент среза.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.range(0, items.len()))
    }

    /// Взвешенный выбор: возвращает индекс элемента. Нулевые и отрицательные веса не выбираются.
    pub fn pick_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let mut roll = self.next_f64() * total;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            if roll < w {
                return Some(i);
            }
            roll -= w;
        }
        // Погрешность округления: последний положительный вес
        weights.iter().rposition(|w| *w > 0.0)
    }
}

impl RngCore for XorShift32 {
    fn next_u32(&mut self) -> u32 {
        self.next_state()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.next_state());
        let hi = u64::from(self.next_state());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_state().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for XorShift32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}
