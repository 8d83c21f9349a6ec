use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;
use tokio::fs::OpenOptions;
use tokio::io::{stdin, AsyncRead};
use tokio_stream::StreamExt;
use tokio_util::codec::{BytesCodec, FramedRead};

use atsctools::{OutputListener, TsParser};

pub async fn path_to_async_read(p: Option<PathBuf>) -> Result<Box<dyn AsyncRead + Unpin + Send>> {
    match p {
        Some(p) if p.to_str() != Some("-") => {
            let file = OpenOptions::new()
                .read(true)
                .open(&p)
                .await
                .with_context(|| format!("can not open {}", p.display()))?;
            Ok(Box::new(file))
        }
        _ => Ok(Box::new(stdin())),
    }
}

/// Feeds the whole input to the parser, chunk by chunk as it is read.
pub async fn feed<L: OutputListener>(parser: &mut TsParser<L>, p: Option<PathBuf>) -> Result<()> {
    let mut chunks = FramedRead::new(path_to_async_read(p).await?, BytesCodec::new());
    let mut total = 0;
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        parser.feed_ts_data(&chunk, 0, chunk.len());
        total += chunk.len();
    }
    info!("read {} bytes", total);
    Ok(())
}
