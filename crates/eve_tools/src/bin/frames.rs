use clap::{Parser, Subcommand};
use eve_data::SystemFrame;
use eve_io::{FrameArchive, StorageManager};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect, export and verify eve frame logs", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "data/frames.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints frame counts, growth and the entropy range of each macrocosm.
    Summary {
        #[arg(short, long)]
        macrocosm: Option<usize>,
    },
    /// Writes every frame of a macrocosm to an rkyv archive.
    Export {
        #[arg(short, long)]
        macrocosm: usize,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Reloads an archive and checks it against the frame log.
    Verify {
        #[arg(short, long)]
        archive: PathBuf,
    },
}

#[derive(Serialize, Debug, PartialEq, Eq)]
struct Summary {
    macrocosm: usize,
    frames: usize,
    first_head_side: Option<i64>,
    last_head_side: Option<i64>,
    min_entropy: Option<i64>,
    max_entropy: Option<i64>,
}

fn summarize(macrocosm: usize, frames: &[SystemFrame]) -> Summary {
    Summary {
        macrocosm,
        frames: frames.len(),
        first_head_side: frames.first().map(SystemFrame::head_side),
        last_head_side: frames.last().map(SystemFrame::head_side),
        min_entropy: frames.iter().map(|f| f.global_entropy).min(),
        max_entropy: frames.iter().map(|f| f.global_entropy).max(),
    }
}

fn load_frames(storage: &StorageManager, macrocosm: usize) -> anyhow::Result<Vec<SystemFrame>> {
    Ok(storage
        .frames(macrocosm)?
        .into_iter()
        .map(|stored| stored.frame)
        .collect())
}

/// Describes the first difference between an archive and the log, if any.
fn compare(archive: &FrameArchive, logged: &[SystemFrame], fingerprint: Option<&str>) -> Option<String> {
    if let Some(fp) = fingerprint {
        if fp != archive.fingerprint {
            return Some(format!(
                "config fingerprint differs: archive {} vs log {}",
                archive.fingerprint, fp
            ));
        }
    }
    if archive.frames.len() != logged.len() {
        return Some(format!(
            "frame count differs: archive {} vs log {}",
            archive.frames.len(),
            logged.len()
        ));
    }
    archive
        .frames
        .iter()
        .zip(logged)
        .position(|(a, b)| a != b)
        .map(|seq| format!("frame {} differs", seq))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let storage = StorageManager::new(&args.db)?;

    match args.command {
        Command::Summary { macrocosm } => {
            let ids = match macrocosm {
                Some(id) => vec![id],
                None => storage.macrocosms()?,
            };
            for id in ids {
                let summary = summarize(id, &load_frames(&storage, id)?);
                println!("{}", eve_io::to_json_pretty(&summary)?);
            }
        }
        Command::Export { macrocosm, out } => {
            let frames = load_frames(&storage, macrocosm)?;
            anyhow::ensure!(!frames.is_empty(), "No frames recorded for macrocosm {}", macrocosm);
            let fingerprint = storage.meta("fingerprint")?.unwrap_or_default();
            let archive = FrameArchive::new(macrocosm, fingerprint, frames);
            archive.save(&out)?;
            println!(
                "Exported {} frames of macrocosm {} to {}",
                archive.frames.len(),
                macrocosm,
                out.display()
            );
        }
        Command::Verify { archive } => {
            let archive = FrameArchive::load(&archive)?;
            let macrocosm = usize::try_from(archive.macrocosm)?;
            let logged = load_frames(&storage, macrocosm)?;
            let fingerprint = storage.meta("fingerprint")?;
            match compare(&archive, &logged, fingerprint.as_deref()) {
                None => println!(
                    "Archive matches the log: {} frames of macrocosm {}",
                    archive.frames.len(),
                    macrocosm
                ),
                Some(reason) => anyhow::bail!("Verification failed: {}", reason),
            }
        }
    }

    Ok(())
}
