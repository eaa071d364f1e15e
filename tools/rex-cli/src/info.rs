//! `rex info` - summarize the contents of a REX file

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use rex_format::{BlockData, NO_TEXTURE, RexDocument};

#[derive(Args)]
pub struct InfoArgs {
    /// REX file to inspect
    pub file: PathBuf,

    /// Emit the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct FileSummary {
    file_size: u64,
    version: u16,
    crc32: u32,
    srid: u32,
    authority: String,
    global_offset: [f32; 3],
    blocks: Vec<BlockSummary>,
}

#[derive(Serialize)]
struct BlockSummary {
    id: u64,
    kind: &'static str,
    detail: String,
}

pub fn execute(args: InfoArgs) -> Result<()> {
    let buffer = fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let doc = RexDocument::from_bytes(&buffer)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;

    let summary = summarize(&doc, buffer.len() as u64);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_text(&summary);
    }

    Ok(())
}

fn summarize(doc: &RexDocument, file_size: u64) -> FileSummary {
    let offset = doc.coordinate_system.global_offset;
    FileSummary {
        file_size,
        version: doc.meta.version,
        crc32: doc.meta.crc32,
        srid: doc.coordinate_system.srid,
        authority: doc.coordinate_system.authority.clone(),
        global_offset: [offset.x, offset.y, offset.z],
        blocks: doc
            .blocks
            .iter()
            .map(|block| {
                let (kind, detail) = describe(&block.data);
                BlockSummary {
                    id: block.data_id,
                    kind,
                    detail,
                }
            })
            .collect(),
    }
}

fn describe(data: &BlockData) -> (&'static str, String) {
    match data {
        BlockData::LineSet(line_set) => {
            ("LineSet", format!("{} vertices", line_set.vertices.len()))
        }
        BlockData::Text(text) => ("Text", format!("{:?}, size {}", text.text, text.size)),
        BlockData::PointList(point_list) => (
            "PointList",
            format!(
                "{} points, {} colors",
                point_list.vertices.len(),
                point_list.colors.len()
            ),
        ),
        BlockData::Mesh(mesh) => {
            let material = if mesh.material_id == NO_TEXTURE {
                "none".to_string()
            } else {
                mesh.material_id.to_string()
            };
            (
                "Mesh",
                format!(
                    "{:?}: {} vertices, {} triangles, lod {}/{}, material {}",
                    mesh.name,
                    mesh.vertices.len(),
                    mesh.triangle_count(),
                    mesh.lod,
                    mesh.max_lod,
                    material
                ),
            )
        }
        BlockData::Image(image) => (
            "Image",
            format!("{:?}, {} bytes", image.compression, image.data.len()),
        ),
        BlockData::MaterialStandard(material) => (
            "MaterialStandard",
            format!(
                "diffuse ({:.2}, {:.2}, {:.2}), alpha {:.2}{}",
                material.diffuse.x,
                material.diffuse.y,
                material.diffuse.z,
                material.alpha,
                if material.has_any_texture() {
                    ", textured"
                } else {
                    ""
                }
            ),
        ),
    }
}

fn print_text(summary: &FileSummary) {
    println!("REX container, {} bytes", summary.file_size);
    println!("  version:   {}", summary.version);
    println!("  crc32:     {:#010x} (unverified)", summary.crc32);
    println!(
        "  reference: {}:{}, offset ({}, {}, {})",
        summary.authority,
        summary.srid,
        summary.global_offset[0],
        summary.global_offset[1],
        summary.global_offset[2]
    );
    println!("  blocks:    {}", summary.blocks.len());
    for block in &summary.blocks {
        println!("    #{:<4} {:<17} {}", block.id, block.kind, block.detail);
    }
}
