mod api;
mod applications;
mod config;
mod demo;
mod detail;
mod error;
mod filters;
mod models;
mod profile;
mod query;
mod render;
mod resume;
mod search;
mod session;
#[cfg(test)]
mod testing;
mod tui;
mod url_sync;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use api::{HttpClient, JobBoardApi};
use config::Config;
use detail::{ApplyOutcome, ApplyState, DetailFlow, DetailState};
use filters::{FilterState, PartialFilterState};
use models::{
    ApplicationStatus, Credentials, EducationEntry, ExperienceEntry, ExperienceLevel, JobType, Registration,
    Role, User,
};
use profile::ProfileForm;
use resume::{ResumeFile, ResumeUploader};
use search::{SearchController, SortOrder};
use session::Session;
use url_sync::UrlSync;

#[derive(Parser)]
#[command(name = "careerconnect")]
#[command(about = "Search job listings, apply, and manage your candidate profile")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        email: String,

        #[arg(short, long, env = "CAREERCONNECT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and log in
    Register {
        name: String,

        email: String,

        #[arg(short, long, env = "CAREERCONNECT_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(short, long, value_enum, default_value_t = Role::Candidate)]
        role: Role,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user and available sections
    Whoami,

    /// Search job listings
    Search {
        /// Job title, keywords, or company
        keyword: Option<String>,

        /// City, state, or remote
        #[arg(short, long)]
        location: Option<String>,

        /// Required skill (repeatable)
        #[arg(short, long = "skill")]
        skills: Vec<String>,

        /// Job type: Full-time, Part-time, Contract, Remote, Hybrid (repeatable)
        #[arg(short = 't', long = "job-type")]
        job_types: Vec<JobType>,

        /// Experience level: Entry, Mid, Senior, Lead, Executive
        #[arg(short, long)]
        experience: Option<ExperienceLevel>,

        /// Minimum salary in thousands
        #[arg(long)]
        salary_min: Option<u32>,

        /// Maximum salary in thousands
        #[arg(long)]
        salary_max: Option<u32>,

        /// Start from a shared search link
        #[arg(long)]
        from_url: Option<String>,

        #[arg(long, value_enum, default_value_t = SortOrder::Relevance)]
        sort: SortOrder,

        /// Drop skill, job type, experience and salary filters
        #[arg(long)]
        clear: bool,

        /// Open the results in the interactive browser
        #[arg(short, long)]
        browse: bool,
    },

    /// Show a job listing
    Show {
        id: String,
    },

    /// Apply to a job listing
    Apply {
        id: String,

        #[arg(short, long)]
        cover_letter: Option<String>,
    },

    /// List your applications
    Applications {
        /// Only show one status (applied, under-review, shortlisted, rejected, hired)
        #[arg(short, long)]
        status: Option<ApplicationStatus>,
    },

    /// Change an application's status
    ApplicationsUpdate {
        id: String,

        status: ApplicationStatus,
    },

    /// View or edit your candidate profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Manage your resume
    Resume {
        #[command(subcommand)]
        command: ResumeCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show your profile
    Show,

    /// Set a profile field (name, email, location, phone, bio)
    Set {
        field: String,

        value: String,
    },

    /// Add a skill
    AddSkill {
        skill: String,
    },

    /// Remove a skill
    RemoveSkill {
        skill: String,
    },

    /// Add a work experience entry
    AddExperience {
        title: String,

        company: String,

        /// e.g. "2021 - 2024"
        #[arg(short, long, default_value = "")]
        duration: String,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Add an education entry
    AddEducation {
        degree: String,

        school: String,

        #[arg(short, long, default_value = "")]
        year: String,
    },
}

#[derive(Subcommand)]
enum ResumeCommands {
    /// Upload a PDF or Word resume
    Upload {
        file: PathBuf,
    },
}

fn init_tracing(config: &Config) {
    // stdout carries command output; logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config);

    let session = Session::load(&config.session_path)?;
    let api = HttpClient::new(&config).context("Failed to create HTTP client")?;
    if let Some(cookie) = session.as_ref().and_then(|s| s.cookie.as_deref()) {
        api.restore_cookies(cookie);
    }

    match cli.command {
        Commands::Login { email, password } => {
            let user = api
                .login(&Credentials { email, password })
                .context("Login failed")?;
            start_session(&config, &api, user)?;
        }

        Commands::Register { name, email, password, role } => {
            let user = api
                .register(&Registration { name, email, password, role })
                .context("Registration failed")?;
            start_session(&config, &api, user)?;
        }

        Commands::Logout => {
            if session.is_some() {
                if let Err(e) = api.logout() {
                    warn!(error = %e, "logout request failed; clearing local session anyway");
                }
            }
            Session::clear(&config.session_path)?;
            println!("Logged out.");
        }

        Commands::Whoami => {
            match &session {
                Some(s) => {
                    println!("{} <{}>", s.user.name, s.user.email);
                    println!("Role: {}", s.user.role);
                }
                None => println!("Not logged in."),
            }
            println!("Menu: {}", session::menu(session.as_ref()).join(" | "));
        }

        Commands::Search {
            keyword,
            location,
            skills,
            job_types,
            experience,
            salary_min,
            salary_max,
            from_url,
            sort,
            clear,
            browse,
        } => {
            let mut url = UrlSync::new(&config.web_url)?;
            let initial = match &from_url {
                Some(address) => url
                    .initial_filters(address)
                    .with_context(|| format!("Invalid search link: {}", address))?,
                None => FilterState::default(),
            };
            let keyword = keyword.unwrap_or_else(|| initial.keyword.clone());
            let location = location.unwrap_or_else(|| initial.location.clone());

            let mut search = SearchController::new(initial, url, config.demo_fallback);
            search.set_sort(sort);
            let store = search.filter_store();
            store.apply(PartialFilterState {
                experience_level: experience.map(Some),
                salary_min: salary_min.map(Some),
                salary_max: salary_max.map(Some),
                ..Default::default()
            });
            let skills: BTreeSet<String> = skills.iter().map(|s| s.trim().to_string()).collect();
            for skill in skills.iter().filter(|s| !s.is_empty()) {
                store.toggle_skill(skill);
            }
            for job_type in job_types.into_iter().collect::<BTreeSet<_>>() {
                store.toggle_job_type(job_type);
            }
            if clear {
                search.filter_store().clear();
            }
            search.submit(&keyword, &location);
            search.run(&api).context("Search failed")?;

            if browse {
                return tui::run_browse(&mut search, &api, session.as_ref());
            }

            let listings = search.listings();
            println!("{}", render::heading(search.status(), listings.len()));
            let active = search.filters().active_filter_count();
            if active > 0 {
                println!("{} filters active", active);
            }
            println!();
            for line in render::view_lines(&search.view()) {
                println!("{}", line);
            }
            println!("Share: {}", search.address());
        }

        Commands::Show { id } => {
            let mut flow = DetailFlow::new(&id);
            match flow.load(&api, config.demo_fallback).context("Failed to load job")? {
                DetailState::Found { job, apply } => {
                    for line in render::detail_lines(job, 80) {
                        println!("{}", line);
                    }
                    println!();
                    match apply {
                        ApplyState::Applied => println!("You have applied to this job."),
                        _ => println!("Apply with: careerconnect apply {}", job.id),
                    }
                }
                _ => println!("Job #{} not found.", id),
            }
        }

        Commands::Apply { id, cover_letter } => {
            let mut flow = DetailFlow::new(&id);
            if let Some(letter) = &cover_letter {
                flow = flow.with_cover_letter(letter);
            }
            if let DetailState::NotFound = flow.load(&api, config.demo_fallback).context("Failed to load job")? {
                println!("Job #{} not found.", id);
                return Ok(());
            }
            match flow.apply(session.as_ref(), &api) {
                ApplyOutcome::RedirectToLogin => println!("Please log in first: careerconnect login"),
                ApplyOutcome::Rejected(reason) => println!("{}", reason),
                ApplyOutcome::Submitted => println!("Application submitted successfully!"),
                ApplyOutcome::AlreadyApplied => println!("You have already applied to this job."),
                ApplyOutcome::Failed(reason) => return Err(anyhow!(reason)),
            }
        }

        Commands::Applications { status } => {
            let apps = applications::fetch(&api, config.demo_fallback).context("Failed to load applications")?;
            println!("{}", applications::tab_labels(&apps).join("  "));
            println!();

            let shown = applications::filter(&apps, status);
            if shown.is_empty() {
                println!("{}", applications::empty_message(status));
                return Ok(());
            }

            println!("{:<26} {:<30} {:<20} {:<14} {:>12}", "ID", "TITLE", "COMPANY", "STATUS", "APPLIED");
            println!("{}", "-".repeat(106));
            for app in shown {
                println!(
                    "{:<26} {:<30} {:<20} {:<14} {:>12}",
                    truncate(&app.id, 26),
                    truncate(&app.job.title, 30),
                    truncate(&app.job.company.name, 20),
                    app.status.as_str(),
                    app.applied_at.format("%Y-%m-%d").to_string()
                );
                println!("    {}", applications::timeline(app.status).render());
                if let Some(step) = applications::next_step(app.status) {
                    println!("    Next: {}", step);
                }
            }
        }

        Commands::ApplicationsUpdate { id, status } => {
            api.update_application_status(&id, status)
                .context("Failed to update application")?;
            println!("Application {} marked as {}.", id, status);
        }

        Commands::Profile { command } => {
            let (user, mut form) = profile_form(&api, session.as_ref())?;
            match command {
                ProfileCommands::Show => print_profile(&user, &form),
                ProfileCommands::Set { field, value } => {
                    form.set_field(&field, &value)?;
                    save_profile(&mut form, &api)?;
                }
                ProfileCommands::AddSkill { skill } => {
                    if !form.add_skill(&skill) {
                        println!("'{}' is already in your skills.", skill.trim());
                        return Ok(());
                    }
                    save_profile(&mut form, &api)?;
                }
                ProfileCommands::RemoveSkill { skill } => {
                    if !form.remove_skill(&skill) {
                        println!("'{}' is not in your skills.", skill.trim());
                        return Ok(());
                    }
                    save_profile(&mut form, &api)?;
                }
                ProfileCommands::AddExperience { title, company, duration, description } => {
                    form.add_experience(ExperienceEntry { title, company, duration, description });
                    save_profile(&mut form, &api)?;
                }
                ProfileCommands::AddEducation { degree, school, year } => {
                    form.add_education(EducationEntry { degree, school, year });
                    save_profile(&mut form, &api)?;
                }
            }
        }

        Commands::Resume { command } => match command {
            ResumeCommands::Upload { file } => upload_resume(&api, session.as_ref(), &file)?,
        },
    }

    Ok(())
}

fn start_session(config: &Config, api: &HttpClient, user: User) -> Result<()> {
    let session = Session::new(user, api.cookie_header());
    session.save(&config.session_path)?;
    info!(user = %session.user.email, "session stored");
    println!("Logged in as {} ({})", session.user.name, session.user.role);
    Ok(())
}

/// Validates the file locally, uploads it, then merges parsed skills into the profile.
fn upload_resume(api: &dyn JobBoardApi, session: Option<&Session>, path: &Path) -> Result<()> {
    let resume = ResumeFile::from_path(path)?;
    resume::validate(&resume)?;

    let (_, mut form) = profile_form(api, session)?;
    let uploader = ResumeUploader::new();
    let response = uploader.upload(api, &resume)?;
    println!("Resume uploaded successfully!");
    if let Some(url) = &response.url {
        println!("Stored at: {}", url);
    }
    if let Some(years) = response.parsed_data.as_ref().and_then(|p| p.experience) {
        println!("Detected experience: {} years", years);
    }

    let added = form.apply_resume(&response);
    if added > 0 {
        println!("Found {} new skill(s) in your resume.", added);
        save_profile(&mut form, api)?;
    }
    Ok(())
}

fn save_profile(form: &mut ProfileForm, api: &dyn JobBoardApi) -> Result<()> {
    if !form.is_dirty() {
        println!("No changes to save.");
        return Ok(());
    }
    if let Err(e) = form.save(api) {
        form.cancel();
        return Err(e.into());
    }
    println!("Profile updated successfully!");
    Ok(())
}

/// Loads the current user from the backend and opens an editable profile.
fn profile_form(api: &dyn JobBoardApi, session: Option<&Session>) -> Result<(User, ProfileForm)> {
    let session = session.ok_or_else(|| anyhow!("Please log in first: careerconnect login"))?;
    let user = api.current_user().context("Failed to load profile")?;
    let current = Session::new(user, session.cookie.clone());
    let form = ProfileForm::for_session(&current)?;
    Ok((current.user, form))
}

fn print_profile(user: &User, form: &ProfileForm) {
    let profile = form.profile();
    println!("{}", profile.name);
    println!("Email: {}", profile.email);
    for (label, value) in [("Location", &profile.location), ("Phone", &profile.phone)] {
        if !value.is_empty() {
            println!("{}: {}", label, value);
        }
    }
    if !profile.bio.is_empty() {
        println!("\n{}", textwrap::fill(&profile.bio, 80));
    }

    println!("\nSkills:");
    if profile.skills.is_empty() {
        println!("  No skills added yet");
    } else {
        println!("  {}", profile.skills.join(", "));
    }

    if !profile.experience.is_empty() {
        println!("\nExperience:");
        for entry in &profile.experience {
            println!("  {} at {} ({})", entry.title, entry.company, entry.duration);
            if !entry.description.is_empty() {
                println!("    {}", truncate(&entry.description, 70));
            }
        }
    }

    if !profile.education.is_empty() {
        println!("\nEducation:");
        for entry in &profile.education {
            println!("  {}, {} ({})", entry.degree, entry.school, entry.year);
        }
    }

    match user.resume.as_ref().and_then(|r| r.url.as_deref()) {
        Some(url) => println!("\nResume: {}", url),
        None => println!("\nResume: none uploaded (careerconnect resume upload <file>)"),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResumeError;
    use crate::testing::{FakeApi, user};
    use std::io::Write;

    fn candidate() -> Session {
        Session::new(user("u1", "Ada", Role::Candidate), None)
    }

    fn resume_file(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        tmp.write_all(bytes).unwrap();
        tmp
    }

    #[test]
    fn test_oversized_resume_is_refused_before_any_request() {
        let api = FakeApi::failing(503);
        let tmp = resume_file(".pdf", &vec![0u8; 6 * 1024 * 1024]);
        let err = upload_resume(&api, Some(&candidate()), tmp.path()).unwrap_err();
        assert!(matches!(err.downcast_ref::<ResumeError>(), Some(ResumeError::TooLarge(_))));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_unsupported_resume_type_is_refused_before_any_request() {
        let api = FakeApi::default();
        let tmp = resume_file(".png", b"\x89PNG");
        let err = upload_resume(&api, Some(&candidate()), tmp.path()).unwrap_err();
        assert_eq!(err.to_string(), "Please upload a PDF or Word document");
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_resume_upload_merges_parsed_skills() {
        let mut api = FakeApi::default();
        api.user = Some(user("u1", "Ada", Role::Candidate));
        api.parsed_skills = vec!["Rust".to_string()];
        let tmp = resume_file(".pdf", b"%PDF-1.7");
        upload_resume(&api, Some(&candidate()), tmp.path()).unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], "GET /auth/profile");
        assert!(calls[1].starts_with("POST /profile/resume "));
        assert_eq!(calls[2], "PUT /profile");
    }
}
