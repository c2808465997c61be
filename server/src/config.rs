use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    /// One file per document under `--annotation-dir`.
    File,
    /// Process memory; everything is lost on restart.
    Memory,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    #[arg(long, env = "PDFMARK_ANNOTATION_DIR")]
    pub annotation_dir: Option<PathBuf>,
    #[arg(long, env = "PDFMARK_PUBLIC_DIR")]
    pub public_dir: Option<PathBuf>,
    #[arg(long, value_enum, env = "PDFMARK_STORAGE", default_value = "file")]
    pub storage: StorageKind,
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
    #[arg(long, env = "PDFMARK_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,
}

impl Args {
    pub fn annotation_dir(&self) -> PathBuf {
        self.annotation_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../annotations"))
    }

    pub fn public_dir(&self) -> PathBuf {
        self.public_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"))
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_flags() {
        let args = Args::try_parse_from(["pdfmark_server"]).unwrap();
        assert_eq!(args.storage, StorageKind::File);
        assert!(args.addr().ip().is_unspecified());
        assert!(args.annotation_dir().ends_with("../annotations"));
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "pdfmark_server",
            "--storage",
            "memory",
            "--port",
            "8080",
            "--host",
            "127.0.0.1",
            "--annotation-dir",
            "/tmp/marks",
        ])
        .unwrap();
        assert_eq!(args.storage, StorageKind::Memory);
        assert_eq!(args.addr(), "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(args.annotation_dir(), PathBuf::from("/tmp/marks"));
    }
}
