use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use chrono::Local;
use tracing::{info, warn};

use cm3d::config::{Cm3dConfig, WorkingDirectory};
use cm3d::export::{records_to_csv, CsvOptions};
use cm3d::ingest::{read_file, IngestOptions};
use cm3d::mock::{mock_study_workbook, template_workbook};
use cm3d::query::{get_denormalised, get_filtered};
use cm3d::services::{StudyService, StudyUpdate};
use cm3d::workbook::write_workbook;
use cm3d::Store;

const DEFAULT_USER: &str = "anonymous-cli";

/// Working directory plus the resolved database path for one invocation
pub struct Context {
    workdir: WorkingDirectory,
    database: PathBuf,
}

impl Context {
    pub fn open(dir: PathBuf, database: Option<PathBuf>) -> Result<Self> {
        let workdir = WorkingDirectory::open(&dir)
            .with_context(|| format!("Failed to read configuration in {}", dir.display()))?;
        let database = database.unwrap_or_else(|| workdir.database_path());
        Ok(Self { workdir, database })
    }

    fn database_str(&self) -> String {
        self.database.to_string_lossy().into_owned()
    }

    /// Open the existing database and bring its schema up to date
    async fn store(&self) -> Result<Store> {
        if !self.database.exists() {
            bail!(
                "Database {} not found; run `cm3d create-db` first",
                self.database.display()
            );
        }
        let store = Store::open(&self.database_str())
            .await
            .with_context(|| format!("Failed to open database {}", self.database.display()))?;
        store.migrate().await?;
        Ok(store)
    }
}

fn timestamp() -> String {
    Local::now().format("%Y%m%d-%H%M%S").to_string()
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

pub async fn init(ctx: &Context) -> Result<()> {
    let workdir = &ctx.workdir;
    workdir.create_dirs()?;

    let config_path = workdir.config_path();
    if !config_path.exists() {
        write_output(&config_path, Cm3dConfig::default().to_toml_string()?.as_bytes())?;
        info!("Wrote {}", config_path.display());
    }

    let template = workdir.template_path();
    if template.exists() {
        warn!("Keeping existing template {}", template.display());
    } else {
        write_output(&template, &write_workbook(&template_workbook())?)?;
        info!("Wrote input template {}", template.display());
    }

    let store = Store::open(&ctx.database_str()).await?;
    store.migrate().await?;

    println!("Initialised CM3D working directory {}", workdir.root().display());
    Ok(())
}

pub async fn create_db(ctx: &Context, drop: bool) -> Result<()> {
    let store = Store::open(&ctx.database_str()).await?;
    if drop {
        store.recreate().await?;
    } else {
        store.migrate().await?;
    }
    println!("Database ready at {}", ctx.database.display());
    Ok(())
}

pub async fn add_study(
    ctx: &Context,
    file: &Path,
    username: Option<String>,
    strict_ids: bool,
) -> Result<()> {
    let mut options =
        IngestOptions::default().with_added_by(username.unwrap_or_else(|| DEFAULT_USER.to_string()));
    if strict_ids {
        options = options.strict();
    }

    let graph = read_file(file, &options)
        .with_context(|| format!("Failed to ingest {}", file.display()))?;

    let service = StudyService::new(ctx.store().await?);
    let persisted = service.persist(&graph).await?;
    let counts = service.summary(persisted.id).await?;

    println!(
        "Successfully added study (id={}) with {} groups, {} biological replicas, {} measurements.",
        persisted.id, counts.groups, counts.biological_replicas, counts.measurements
    );
    Ok(())
}

pub async fn export_db(ctx: &Context, output: Option<PathBuf>) -> Result<()> {
    let store = ctx.store().await?;
    let set = get_denormalised(&store).await?;
    let csv = records_to_csv(&set, &CsvOptions::default())?;

    let output = output.unwrap_or_else(|| {
        ctx.workdir
            .downloads_dir()
            .join(format!("cm3d_export_{}.csv", timestamp()))
    });
    write_output(&output, csv.as_bytes())?;
    println!("Exported {} rows to {}", set.len(), output.display());
    Ok(())
}

pub async fn query_db(
    ctx: &Context,
    predicate: Option<String>,
    saved: Option<String>,
    flatten: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let predicate = match (predicate, saved) {
        (Some(predicate), _) => predicate,
        (None, Some(name)) => ctx.workdir.config().saved_filter(&name)?.to_string(),
        (None, None) => bail!("Give a predicate or --saved <name>"),
    };

    let store = ctx.store().await?;
    let set = get_filtered(&store, &predicate, flatten).await?;
    let csv = records_to_csv(&set, &CsvOptions::with_index("number"))?;

    match output {
        Some(path) => {
            write_output(&path, csv.as_bytes())?;
            println!("Wrote {} rows to {}", set.len(), path.display());
        }
        None => print!("{}", csv),
    }
    Ok(())
}

pub async fn list_studies(ctx: &Context) -> Result<()> {
    let service = StudyService::new(ctx.store().await?);
    let studies = service.list().await?;
    if studies.is_empty() {
        println!("No studies stored.");
        return Ok(());
    }

    for study in studies {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            study.id,
            study.date_input,
            study.title,
            study.authors,
            study.added_by.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn download_study(ctx: &Context, id: i32, output: Option<PathBuf>) -> Result<()> {
    let service = StudyService::new(ctx.store().await?);
    let bytes = service.uploaded_file(id).await?;

    let output =
        output.unwrap_or_else(|| ctx.workdir.downloads_dir().join(format!("study_{}.xlsx", id)));
    write_output(&output, &bytes)?;
    println!("Wrote study {} workbook to {}", id, output.display());
    Ok(())
}

pub async fn update_study(
    ctx: &Context,
    id: i32,
    title: Option<String>,
    authors: Option<String>,
) -> Result<()> {
    let changes = StudyUpdate { title, authors };
    if changes.is_empty() {
        bail!("Nothing to update; pass --title and/or --authors");
    }

    let service = StudyService::new(ctx.store().await?);
    let study = service.update(id, changes).await?;
    println!("Updated study {}: '{}' by {}", study.id, study.title, study.authors);
    Ok(())
}

pub async fn delete_study(ctx: &Context, id: i32) -> Result<()> {
    let service = StudyService::new(ctx.store().await?);
    service.delete(id).await?;
    println!("Deleted study {}", id);
    Ok(())
}

pub fn mock_study(ctx: &Context, output: Option<PathBuf>) -> Result<()> {
    let workbook = mock_study_workbook(&mut rand::thread_rng());
    let output = output.unwrap_or_else(|| {
        ctx.workdir
            .uploads_dir()
            .join(format!("mock_study_{}.xlsx", timestamp()))
    });
    write_output(&output, &write_workbook(&workbook)?)?;
    println!("Wrote mock study to {}", output.display());
    Ok(())
}

pub fn check(ctx: &Context) -> Result<()> {
    let workdir = &ctx.workdir;
    println!("Checking working directory {}", workdir.root().display());

    let mut missing = workdir.check();
    if ctx.database != workdir.database_path() && !ctx.database.exists() {
        missing.push(ctx.database.display().to_string());
    }
    if missing.is_empty() {
        println!("CM3D setup okay!");
        return Ok(());
    }

    for item in &missing {
        println!("{} not found in working directory.", item);
    }
    bail!("CM3D not set up correctly")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_then_check() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::open(dir.path().to_path_buf(), None).unwrap();

        assert!(check(&ctx).is_err());
        init(&ctx).await.unwrap();
        check(&ctx).unwrap();
    }

    #[tokio::test]
    async fn test_mock_study_can_be_added() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::open(dir.path().to_path_buf(), None).unwrap();
        init(&ctx).await.unwrap();

        let mock = dir.path().join("mock.xlsx");
        mock_study(&ctx, Some(mock.clone())).unwrap();
        add_study(&ctx, &mock, None, true).await.unwrap();

        let studies = StudyService::new(ctx.store().await.unwrap())
            .list()
            .await
            .unwrap();
        assert_eq!(studies.len(), 1);
        assert_eq!(studies[0].added_by.as_deref(), Some(DEFAULT_USER));
    }

    #[tokio::test]
    async fn test_commands_need_a_database() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::open(dir.path().to_path_buf(), None).unwrap();
        let err = list_studies(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("create-db"));
    }
}
