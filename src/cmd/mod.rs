use log::LevelFilter;

pub mod channels;
pub mod events;
mod io;

pub fn init_logger(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter(
        None,
        if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        },
    );
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse(&filters);
    }
    builder.init();
}
