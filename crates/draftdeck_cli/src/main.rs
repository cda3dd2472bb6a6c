//! Command-line front end for DraftDeck.
//!
//! # Responsibility
//! - Map one subcommand to one `Workbench` action per process.
//! - Resume the persisted session before any command that needs it.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use draftdeck_core::{
    init_logging, ClientConfig, DocType, Project, ProjectDraft, ProjectId, Screen, SectionId,
    Workbench,
};
use std::path::PathBuf;

/// DraftDeck - AI-assisted docx/pptx authoring
#[derive(Parser, Debug)]
#[command(name = "draftdeck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
    },

    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List projects
    Projects,

    /// Create a project and generate its content
    Create(CreateArgs),

    /// Print a project with its sections
    Show { project: ProjectId },

    /// Regenerate every section of a project
    Generate { project: ProjectId },

    /// Delete a project
    Delete {
        project: ProjectId,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Rewrite one section following a prompt
    Refine {
        project: ProjectId,
        section: SectionId,
        prompt: String,
    },

    /// Comment on a section
    Comment {
        project: ProjectId,
        section: SectionId,
        text: String,
    },

    /// Like or dislike a section
    Feedback {
        project: ProjectId,
        section: SectionId,

        /// Record a dislike instead of a like
        #[arg(long)]
        dislike: bool,
    },

    /// Download the rendered document
    Export {
        project: ProjectId,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    title: String,

    #[arg(long, default_value = "")]
    topic: String,

    /// docx or pptx
    #[arg(long, default_value = "docx")]
    doc_type: DocType,

    /// Section title, in order; repeat for more sections
    #[arg(long = "section", required = true)]
    sections: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::from_env().context("invalid configuration")?;
    if let Err(err) = init_logging(&config.log_level, &config.log_dir()) {
        eprintln!("warning: logging disabled: {err}");
    }
    let workbench = Workbench::connect(&config).context("could not open the client")?;
    run(&workbench, cli.command).await
}

async fn run(workbench: &Workbench, command: Command) -> Result<()> {
    match command {
        Command::Register {
            email,
            password,
            full_name,
        } => {
            workbench
                .register(&email, &password, full_name.as_deref())
                .await?;
            println!("Account created for {email}. Log in with `draftdeck login`.");
        }
        Command::Login { email, password } => {
            let identity = workbench.login(&email, &password).await?;
            println!("Logged in as {}", identity.display_name());
        }
        Command::Logout => {
            workbench.logout();
            println!("Logged out");
        }
        Command::Whoami => {
            resume(workbench).await?;
            let identity = workbench
                .session()
                .identity()
                .ok_or_else(|| anyhow!("identity is not available"))?;
            println!("{} <{}>", identity.display_name(), identity.email);
        }
        Command::Projects => {
            resume(workbench).await?;
            let projects = workbench.catalog().projects();
            if projects.is_empty() {
                println!("No projects yet");
            }
            for project in projects {
                println!("{:>6}  {:<4}  {}", project.id, project.doc_type.extension(), project.title);
            }
        }
        Command::Create(args) => {
            resume(workbench).await?;
            let draft =
                ProjectDraft::with_sections(args.title, args.topic, args.doc_type, args.sections);
            let project = workbench.create_project(&draft).await?;
            print_project(&project);
        }
        Command::Show { project } => {
            resume(workbench).await?;
            print_project(&workbench.open_project(project).await?);
        }
        Command::Generate { project } => {
            resume(workbench).await?;
            workbench.open_project(project).await?;
            print_project(&workbench.generate(project).await?);
        }
        Command::Delete { project, yes } => {
            if !yes {
                bail!("refusing to delete project {project} without --yes");
            }
            resume(workbench).await?;
            workbench.delete_project(project).await?;
            println!("Deleted project {project}");
        }
        Command::Refine {
            project,
            section,
            prompt,
        } => {
            resume(workbench).await?;
            workbench.open_project(project).await?;
            let section = workbench.refine(section, &prompt).await?;
            println!("## {}\n\n{}", section.title, section.content.unwrap_or_default());
        }
        Command::Comment {
            project,
            section,
            text,
        } => {
            resume(workbench).await?;
            workbench.open_project(project).await?;
            workbench.comment(section, &text).await?;
            println!("Comment saved");
        }
        Command::Feedback {
            project,
            section,
            dislike,
        } => {
            resume(workbench).await?;
            workbench.open_project(project).await?;
            workbench.feedback(section, !dislike).await?;
            println!("Feedback sent");
        }
        Command::Export { project, out } => {
            resume(workbench).await?;
            workbench.open_project(project).await?;
            let exported = workbench.export().await?;
            let path = exported
                .save_into(&out)
                .with_context(|| format!("could not write into {}", out.display()))?;
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}

async fn resume(workbench: &Workbench) -> Result<()> {
    if workbench.start().await == Screen::Auth {
        bail!("not logged in; run `draftdeck login` first");
    }
    Ok(())
}

fn print_project(project: &Project) {
    println!("# {} ({}, id {})", project.title, project.doc_type, project.id);
    if !project.topic.is_empty() {
        println!("topic: {}", project.topic);
    }
    for section in &project.sections {
        println!();
        println!("## [{}] {}", section.id, section.title);
        match section.content.as_deref() {
            Some(content) if !content.trim().is_empty() => println!("{content}"),
            _ => println!("(not generated yet)"),
        }
    }
}
