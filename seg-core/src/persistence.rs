//! # Snapshot dos Parâmetros
//!
//! Salva e carrega as contagens de treino ([`Counts`]) em JSON. As probabilidades
//! não são gravadas: são recalculadas com [`ProbabilityModel::normalize`] ao
//! carregar, o que garante que o modelo usado sempre corresponde às contagens.
//!
//! ## Atomicidade
//!
//! - **save**: escreve num arquivo temporário no mesmo diretório e renomeia para
//!   o destino. Um leitor concorrente vê o snapshot antigo ou o novo, nunca
//!   um arquivo pela metade.
//! - **load**: lê e valida o arquivo inteiro antes de devolver qualquer coisa.
//!   Arquivo ausente, JSON inválido ou contagens inconsistentes são erro; nunca
//!   caímos silenciosamente para um modelo vazio.
//!
//! [`ProbabilityModel::normalize`]: crate::hmm::ProbabilityModel::normalize

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::counts::Counts;
use crate::error::{SegError, SegResult};

/// Versão atual do formato do snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Conteúdo serializado do snapshot.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    counts: Counts,
}

/// Grava `counts` em `path` de forma atômica.
pub fn save(counts: &Counts, path: &Path) -> SegResult<()> {
    let io_err = |source: std::io::Error| SegError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir).map_err(io_err)?;

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            counts,
        };
        serde_json::to_writer(&mut writer, &snapshot).map_err(|source| SegError::Snapshot {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(io_err)?;
    }

    temp_file.persist(path).map_err(|e| io_err(e.error))?;
    tracing::info!(path = %path.display(), lines = counts.line_count(), "snapshot salvo");
    Ok(())
}

/// Carrega as contagens de `path`, validando versão e consistência.
pub fn load(path: &Path) -> SegResult<Counts> {
    let file = File::open(path).map_err(|source| SegError::Persistence {
        path: path.to_path_buf(),
        source,
    })?;

    let snapshot: Snapshot =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| SegError::Snapshot {
            path: path.to_path_buf(),
            source,
        })?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SegError::Corrupt {
            path: path.to_path_buf(),
            reason: format!(
                "versão {} não suportada (esperada {SNAPSHOT_VERSION})",
                snapshot.version
            ),
        });
    }

    snapshot
        .counts
        .check_consistency()
        .map_err(|reason| SegError::Corrupt {
            path: path.to_path_buf(),
            reason,
        })?;

    tracing::info!(
        path = %path.display(),
        lines = snapshot.counts.line_count(),
        "snapshot carregado"
    );
    Ok(snapshot.counts)
}

/// Versão emprestada de [`Snapshot`], para serializar sem clonar as contagens.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    counts: &'a Counts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counts::accumulate;

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hmm_model.json");

        let counts = accumulate(crate::corpus::demo_corpus()).unwrap();
        save(&counts, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, counts);
    }

    #[test]
    fn test_roundtrip_empty_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vazio.json");

        save(&Counts::default(), &path).unwrap();
        assert_eq!(load(&path).unwrap(), Counts::default());
    }

    #[test]
    fn test_save_overwrites_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("model.json");

        save(&accumulate(["我 爱 北京"]).unwrap(), &path).unwrap();
        let second = accumulate(["天安门 上 太阳 升"]).unwrap();
        save(&second, &path).unwrap();

        assert_eq!(load(&path).unwrap(), second);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nada.json")).unwrap_err();
        assert!(matches!(err, SegError::Persistence { .. }));
    }

    #[test]
    fn test_garbage_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lixo.json");
        fs::write(&path, b"{\"version\": 1, \"counts\": {\"state_count\": [1, 2").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, SegError::Snapshot { .. }));
    }

    #[test]
    fn test_inconsistent_counts_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inconsistente.json");

        // Um estado com ocorrências mas sem início nem transição de entrada
        let json = r#"{
            "version": 1,
            "counts": {
                "state_count": [0, 0, 0, 5],
                "init_count": [0, 0, 0, 1],
                "trans_count": [[0,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]],
                "emit_count": [{}, {}, {}, {}],
                "line_count": 1
            }
        }"#;
        fs::write(&path, json).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, SegError::Corrupt { .. }));
    }

    #[test]
    fn test_overflowing_counts_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("estouro.json");
        let json = format!(
            r#"{{"version": 1, "counts": {{
            "state_count": [0,0,0,0], "init_count": [{max},{max},0,0],
            "trans_count": [[0,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]],
            "emit_count": [{{}}, {{}}, {{}}, {{}}], "line_count": 0}}}}"#,
            max = u64::MAX
        );
        fs::write(&path, json).unwrap();

        assert!(matches!(load(&path).unwrap_err(), SegError::Corrupt { .. }));
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("futuro.json");
        let json = r#"{"version": 99, "counts": {
            "state_count": [0,0,0,0], "init_count": [0,0,0,0],
            "trans_count": [[0,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]],
            "emit_count": [{}, {}, {}, {}], "line_count": 0}}"#;
        fs::write(&path, json).unwrap();

        assert!(matches!(load(&path).unwrap_err(), SegError::Corrupt { .. }));
    }

    proptest::proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn roundtrip_preserves_any_counts(
            lines in proptest::collection::vec(crate::counts::arb_line(), 0..8)
        ) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("model.json");

            let counts = accumulate(&lines).unwrap();
            save(&counts, &path).unwrap();
            proptest::prop_assert_eq!(load(&path).unwrap(), counts);
        }
    }
}
