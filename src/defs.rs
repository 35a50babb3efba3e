//! The usual polyhedral dice.

use std::sync::LazyLock;

use crate::die::Die;

pub static D2: LazyLock<Die> = LazyLock::new(|| Die::standard(2));
pub static D3: LazyLock<Die> = LazyLock::new(|| Die::standard(3));
pub static D4: LazyLock<Die> = LazyLock::new(|| Die::standard(4));
pub static D6: LazyLock<Die> = LazyLock::new(|| Die::standard(6));
pub static D8: LazyLock<Die> = LazyLock::new(|| Die::standard(8));
pub static D10: LazyLock<Die> = LazyLock::new(|| Die::standard(10));
pub static D12: LazyLock<Die> = LazyLock::new(|| Die::standard(12));
pub static D20: LazyLock<Die> = LazyLock::new(|| Die::standard(20));
pub static D100: LazyLock<Die> = LazyLock::new(|| Die::standard(100));
pub static FUDGE: LazyLock<Die> = LazyLock::new(|| Die::standard(3).map(|x| x - 2));

pub fn d2() -> Die {
    D2.clone()
}

pub fn d3() -> Die {
    D3.clone()
}

pub fn d4() -> Die {
    D4.clone()
}

pub fn d6() -> Die {
    D6.clone()
}

pub fn d8() -> Die {
    D8.clone()
}

pub fn d10() -> Die {
    D10.clone()
}

pub fn d12() -> Die {
    D12.clone()
}

pub fn d20() -> Die {
    D20.clone()
}

pub fn d100() -> Die {
    D100.clone()
}

/// Faces `-1, 0, 1`, each with probability one third.
pub fn fudge() -> Die {
    FUDGE.clone()
}
