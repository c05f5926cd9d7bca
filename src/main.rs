use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use admission_oracle::catalog::{CsvCatalog, Program, ProgramFilter};
use admission_oracle::config::{Config, ConfigOverrides};
use admission_oracle::error::RecommendError;
use admission_oracle::grades::{GradeEntry, StudentRecord, SubjectGradeInput};
use admission_oracle::matching::QualifiedProgram;
use admission_oracle::output::csv::{
    catalog_to_csv, clusters_to_csv, programs_to_csv, recommendation_to_csv,
};
use admission_oracle::output::json::{render_json, render_prompt_json};
use admission_oracle::output::table::{
    render_catalog_table, render_clusters_table, render_programs_table, render_quiz_table,
    render_recommendation, render_student_table,
};
use admission_oracle::quiz::{Interest, QuizAnswers, QuizOutcome, Strength, WorkEnvironment};
use admission_oracle::recommend::{Recommendation, RecommendationQuery, RecommendationService};
use admission_oracle::server::run_server;
use admission_oracle::store::SqliteStore;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "admission-oracle",
    about = "KCSE cluster points and program eligibility"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    /// SQLite database holding grades, entitlements and the program catalog.
    #[arg(long)]
    db: Option<String>,
    /// Serve programs from this CSV export instead of the database.
    #[arg(long = "catalog-csv")]
    catalog_csv: Option<String>,
    #[arg(long = "log-level")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Enter or replace a student's grades and recompute cluster points.
    Grades {
        #[arg(short, long)]
        student: String,
        #[arg(long)]
        mean: Option<String>,
        /// Subject grade as `subject=grade`, e.g. `biology=B+` or `maths=9`.
        #[arg(long = "set", value_name = "SUBJECT=GRADE")]
        set: Vec<String>,
    },
    Clusters {
        #[arg(short, long)]
        student: String,
    },
    Recommend {
        #[arg(short, long)]
        student: String,
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<usize>,
    },
    NearMiss {
        #[arg(short, long)]
        student: String,
    },
    /// Suggest a discipline path; with --student also list matching programs.
    Quiz {
        #[arg(long)]
        interest: Interest,
        #[arg(long)]
        strength: Strength,
        #[arg(long)]
        environment: WorkEnvironment,
        #[arg(short, long)]
        student: Option<String>,
    },
    Catalog {
        #[command(subcommand)]
        action: CatalogCommand,
    },
    Unlock {
        #[arg(short, long)]
        student: String,
        #[arg(long)]
        revoke: bool,
    },
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Subcommand)]
enum CatalogCommand {
    List {
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        level: String,
        #[arg(long)]
        path: String,
        #[arg(long = "min-grade", default_value = "Any")]
        min_grade: String,
        #[arg(long = "cluster-points", default_value_t = 0.0)]
        cluster_points: f64,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Copy every program from a CSV export into the database.
    Import { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        db_path: cli.db.clone(),
        catalog_csv: cli.catalog_csv.clone(),
        log_level: cli.log_level.clone(),
    });

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }
    if let Commands::Serve { host, port } = &cli.command {
        let host = host.clone().unwrap_or_else(|| config.server.host.clone());
        let port = port.unwrap_or(config.server.port);
        let bind = format!("{host}:{port}");
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
        return run_server(config, addr).await;
    }

    let db_path = config.resolved_db_path();
    let store = Arc::new(
        SqliteStore::open(&db_path)
            .with_context(|| format!("failed opening database: {}", db_path.display()))?,
    );
    let service = RecommendationService::from_config(&config, store.clone())?;

    match &cli.command {
        Commands::Grades { student, mean, set } => {
            let entry = GradeEntry {
                mean_grade: mean.clone(),
                subjects: parse_subject_pairs(set)?,
            };
            let record = service.save_grades(student, &entry).await?;
            print_student(&record, cli.output)?;
        }
        Commands::Clusters { student } => {
            let record = service
                .student(student)
                .await?
                .ok_or_else(|| anyhow!("no grades on file for {student}; run `grades` first"))?;
            print_clusters(&record, cli.output)?;
        }
        Commands::Recommend {
            student,
            path,
            search,
            page,
        } => {
            let query = RecommendationQuery {
                student_id: student.clone(),
                discipline: path.clone(),
                search: search.clone(),
                page: *page,
            };
            match service.recommend(&query).await {
                Ok(result) => print_recommendation(&result, cli.output)?,
                Err(error) => print_prompt(error, cli.output)?,
            }
        }
        Commands::NearMiss { student } => match service.near_misses(student).await {
            Ok(items) => print_programs("near_miss", &items, cli.output)?,
            Err(error) => print_prompt(error, cli.output)?,
        },
        Commands::Quiz {
            interest,
            strength,
            environment,
            student,
        } => {
            let answers = QuizAnswers {
                interest: *interest,
                strength: *strength,
                environment: *environment,
            };
            print_quiz(&answers.outcome(), cli.output)?;
            if let Some(student) = student {
                match service.recommend(&answers.to_query(student.as_str())).await {
                    Ok(result) => print_recommendation(&result, cli.output)?,
                    Err(error) => print_prompt(error, cli.output)?,
                }
            }
        }
        Commands::Catalog { action } => {
            handle_catalog_command(action, &config, &service, &store, cli.output).await?
        }
        Commands::Unlock { student, revoke } => {
            store.set_unlocked(student, !revoke)?;
            info!("entitlement for {student} set to {}", !revoke);
            if *revoke {
                println!("Revoked full results for {student}");
            } else {
                println!("Unlocked full results for {student}");
            }
        }
        Commands::Serve { .. } | Commands::Config { .. } => {}
    }

    Ok(())
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &PathBuf) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

async fn handle_catalog_command(
    action: &CatalogCommand,
    config: &Config,
    service: &RecommendationService,
    store: &SqliteStore,
    format: OutputFormat,
) -> Result<()> {
    match action {
        CatalogCommand::List { path, search } => {
            let filter = ProgramFilter {
                discipline_path: path.clone(),
                search: search.clone(),
                minimum_mean_grade: None,
            };
            let programs = service.catalog().list_programs(&filter).await?;
            print_catalog(&programs, format)?;
        }
        CatalogCommand::Add {
            name,
            level,
            path,
            min_grade,
            cluster_points,
            description,
        } => {
            warn_if_csv_catalog(config);
            let program = Program::new(name, level, path)
                .with_minimum_grade(min_grade)
                .with_cluster_points(*cluster_points)
                .with_description(description);
            let id = store.insert_program(&program)?;
            println!("Added program #{id}: {name}");
        }
        CatalogCommand::Import { file } => {
            warn_if_csv_catalog(config);
            let source = CsvCatalog::open(file)?;
            for program in source.programs() {
                store.insert_program(program)?;
            }
            println!(
                "Imported {} programs from {}",
                source.programs().len(),
                file.display()
            );
        }
    }
    Ok(())
}

fn warn_if_csv_catalog(config: &Config) {
    if let Some(csv) = config.resolved_catalog_csv() {
        warn!(
            "catalog is served from {}; programs written to the database are not visible until csv_path is cleared",
            csv.display()
        );
    }
}

/// `subject=grade` pairs; the grade may be a letter or a point value.
fn parse_subject_pairs(raw: &[String]) -> Result<BTreeMap<String, SubjectGradeInput>> {
    let mut subjects = BTreeMap::new();
    for pair in raw {
        let (subject, grade) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("expected SUBJECT=GRADE, got `{pair}`"))?;
        subjects.insert(
            subject.trim().to_string(),
            SubjectGradeInput::Symbol(grade.trim().to_string()),
        );
    }
    Ok(subjects)
}

fn print_prompt(error: RecommendError, format: OutputFormat) -> Result<()> {
    let Some(action) = error.action() else {
        return Err(error.into());
    };
    match format {
        OutputFormat::Json => println!("{}", render_prompt_json(&error.to_string(), Some(action))?),
        OutputFormat::Table | OutputFormat::Csv => {
            println!("{error}");
            match action {
                "enter_grades" => println!("Next: admission-oracle grades --student <id> ..."),
                "unlock" => println!("Next: admission-oracle unlock --student <id>"),
                _ => {}
            }
        }
    }
    Ok(())
}

fn print_student(record: &StudentRecord, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_student_table(record)),
        OutputFormat::Json => println!("{}", render_json(record)?),
        OutputFormat::Csv => println!("{}", clusters_to_csv(record)?),
    }
    Ok(())
}

fn print_clusters(record: &StudentRecord, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_clusters_table(record)),
        OutputFormat::Json => println!("{}", render_json(&record.clusters)?),
        OutputFormat::Csv => println!("{}", clusters_to_csv(record)?),
    }
    Ok(())
}

fn print_recommendation(result: &Recommendation, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_recommendation(result)),
        OutputFormat::Json => println!("{}", render_json(result)?),
        OutputFormat::Csv => println!("{}", recommendation_to_csv(result)?),
    }
    Ok(())
}

fn print_programs(section: &str, items: &[QualifiedProgram], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No programs found.");
            } else {
                println!("{}", render_programs_table(items));
            }
        }
        OutputFormat::Json => println!("{}", render_json(items)?),
        OutputFormat::Csv => println!("{}", programs_to_csv(section, items)?),
    }
    Ok(())
}

fn print_catalog(programs: &[Program], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_catalog_table(programs)),
        OutputFormat::Json => println!("{}", render_json(programs)?),
        OutputFormat::Csv => println!("{}", catalog_to_csv(programs)?),
    }
    Ok(())
}

fn print_quiz(outcome: &QuizOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_quiz_table(outcome)),
        OutputFormat::Json => println!("{}", render_json(outcome)?),
        OutputFormat::Csv => {
            warn!("CSV output for quiz not implemented, using JSON");
            println!("{}", render_json(outcome)?);
        }
    }
    Ok(())
}
