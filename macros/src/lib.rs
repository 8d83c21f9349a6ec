/// Bails out of the enclosing `anyhow::Result` function when `$b < $l`.
#[macro_export]
macro_rules! check_len {
    ($b:expr, $l:expr) => {
        if $b < $l {
            anyhow::bail!(
                "{}: too short {}({}), expect {}({})",
                line!(),
                stringify!($b),
                $b,
                stringify!($l),
                $l
            );
        }
    };
}
