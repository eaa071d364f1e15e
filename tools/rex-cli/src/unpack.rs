//! `rex unpack` - extract embedded image blocks

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use rex_format::RexDocument;

#[derive(Args)]
pub struct UnpackArgs {
    /// REX file to unpack
    pub file: PathBuf,

    /// Output directory (created if missing)
    #[arg(short, long, default_value = "rex-images")]
    pub out: PathBuf,
}

pub fn execute(args: UnpackArgs) -> Result<()> {
    let buffer = fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let doc = RexDocument::from_bytes(&buffer)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;

    let mut written = 0usize;
    for (id, image) in doc.images() {
        if written == 0 {
            fs::create_dir_all(&args.out)
                .with_context(|| format!("failed to create {}", args.out.display()))?;
        }
        let path = args
            .out
            .join(format!("{id}.{}", image.compression.extension()));
        fs::write(&path, &image.data)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(id, bytes = image.data.len(), "wrote {}", path.display());
        written += 1;
    }

    println!(
        "extracted {written} image block(s) to {}",
        args.out.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rex_format::{BlockData, Image, ImageCompression};

    #[test]
    fn test_unpack_writes_one_file_per_image() {
        let dir = tempfile::tempdir().unwrap();

        let mut doc = RexDocument::new();
        doc.push(BlockData::Image(Image {
            compression: ImageCompression::Png,
            data: vec![1, 2, 3],
        }));
        doc.push(BlockData::Image(Image {
            compression: ImageCompression::Jpeg,
            data: vec![4, 5],
        }));

        let file = dir.path().join("scene.rex");
        fs::write(&file, doc.to_bytes().unwrap()).unwrap();

        let out = dir.path().join("images");
        execute(UnpackArgs {
            file,
            out: out.clone(),
        })
        .unwrap();

        assert_eq!(fs::read(out.join("1.png")).unwrap(), vec![1, 2, 3]);
        assert_eq!(fs::read(out.join("2.jpg")).unwrap(), vec![4, 5]);
    }
}
