use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use student_portal::api::PortalClient;
use student_portal::attendance::{AttendanceCache, plan};
use student_portal::auth::AuthContext;
use student_portal::config::Config;
use student_portal::error::{PortalError, Result};
use student_portal::models::{AttendanceReport, CourseAttendance};
use student_portal::quizzes::{SortKey, filter_and_sort};
use student_portal::session::{SessionController, SessionHandle, SystemClock};
use student_portal::{client, logging, report, timetable};

#[derive(Parser, Debug)]
#[command(version, about = "Quizzes, attendance and timetable from the student portal")]
struct Cli {
    /// Portal username
    #[arg(short, long, env = "PORTAL_USERNAME", global = true)]
    username: Option<String>,

    /// Portal password
    #[arg(short, long, env = "PORTAL_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Join a timed quiz
    Quiz {
        /// Quiz code; prompted for when omitted
        #[arg(short, long)]
        code: Option<String>,
    },
    /// Attendance summary, lecture-by-lecture records for one course, or
    /// every lecture on one day
    Attendance {
        /// Course code to show daily records for
        #[arg(short, long)]
        course: Option<String>,
        /// Day to show across all courses (YYYY-MM-DD)
        #[arg(short, long, conflicts_with = "course")]
        date: Option<NaiveDate>,
        /// Replace the local cache instead of merging into it
        #[arg(long)]
        refresh: bool,
        /// Target percentage used for the advice column
        #[arg(long, default_value_t = 75.0)]
        target: f64,
    },
    /// Lectures you can miss (or must attend) to hold a target percentage
    Target {
        #[arg(long)]
        present: u32,
        #[arg(long)]
        total: u32,
        #[arg(long, default_value_t = 75.0)]
        target: f64,
    },
    /// Lectures for a day, or the week grid
    Timetable {
        /// Day to show (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Show the whole week as a grid
        #[arg(long, conflicts_with = "date")]
        week: bool,
    },
    /// Evaluated quizzes, or the graded answers of one
    Quizzes {
        /// Filter by course code or quiz code
        #[arg(short, long)]
        search: Option<String>,
        /// Quiz code to review question by question
        #[arg(short, long, conflicts_with = "search")]
        code: Option<String>,
        #[arg(long, value_enum, default_value_t = SortKey::Date)]
        sort: SortKey,
        /// Reverse the natural order
        #[arg(long)]
        asc: bool,
    },
    /// Show the profile, or change password or PIN
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    Pin {
        pin: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    let _guard = logging::init(&config.log_dir, &config.rust_log);

    if let Commands::Target { present, total, target } = cli.command {
        println!("{}", plan(present, total, target)?);
        return Ok(());
    }

    let portal = PortalClient::new(&config)?;
    let auth = login(&portal, &cli).await?;

    let outcome = dispatch(cli.command, &portal, &auth, &config).await;
    auth.logout_with(outcome)
}

async fn dispatch(command: Commands, portal: &PortalClient, auth: &AuthContext, config: &Config) -> Result<()> {
    match command {
        Commands::Quiz { code } => {
            let controller = SessionController::new(portal.quiz_backend(auth), config.poll_interval);
            let handle = SessionHandle::spawn(controller, SystemClock);
            client::run(handle, code).await?;
        }
        Commands::Attendance { date: Some(date), .. } => {
            let records = portal.attendance_on(auth, date).await?;
            print!("{}", report::daily_attendance(date, &records));
        }
        Commands::Attendance { course, refresh, target, .. } => {
            let report = fetch_attendance(portal, auth, config, refresh).await?;
            match course {
                Some(code) => {
                    let course = find_course(&report, &code)?;
                    let records = portal
                        .attendance_records(auth, course.id.unwrap_or(course.cf_id))
                        .await?;
                    print!("{}", report::attendance_records(course, &records));
                }
                None => print!("{}", report::attendance(&report, target)),
            }
        }
        Commands::Timetable { date, week } => {
            let table = portal.timetable(auth).await?;
            if week {
                print!("{}", report::timetable_week(&table));
            } else {
                let now = Local::now().naive_local();
                let date = date.unwrap_or(now.date());
                match timetable::day_for(&table, date) {
                    Some(day) => print!("{}", report::timetable_day(day, now)),
                    None => println!("No timetable for {date}"),
                }
            }
        }
        Commands::Quizzes { code: Some(code), .. } => {
            let review = portal.quiz_backend(auth).review(&code).await?;
            print!("{}", report::quiz_review(&review));
        }
        Commands::Quizzes { search, sort, asc, .. } => {
            let quizzes = portal.evaluated_quizzes(auth).await?;
            let listed = filter_and_sort(&quizzes, search.as_deref(), sort, asc);
            print!("{}", report::quizzes(&listed));
        }
        Commands::Profile { action } => match action {
            None => print!("{}", report::profile(auth.user())),
            Some(ProfileAction::Password { current, new, confirm }) => {
                portal.change_password(auth, &current, &new, &confirm).await?;
                println!("Password updated");
            }
            Some(ProfileAction::Pin { pin }) => {
                portal.set_pin(auth, &pin).await?;
                println!("PIN updated");
            }
        },
        Commands::Target { .. } => {}
    }
    Ok(())
}

async fn login(portal: &PortalClient, cli: &Cli) -> Result<AuthContext> {
    let (Some(username), Some(password)) = (&cli.username, &cli.password) else {
        return Err(PortalError::NotAuthenticated);
    };
    portal.login(username, password).await
}

/// Fetches the summary and mirrors it into the cache. When the network is
/// down a previously cached copy is shown instead.
async fn fetch_attendance(
    portal: &PortalClient,
    auth: &AuthContext,
    config: &Config,
    refresh: bool,
) -> Result<AttendanceReport> {
    let mut cache = AttendanceCache::open(&config.cache_dir);

    match portal.attendance(auth).await {
        Ok(report) => {
            let rows: Vec<CourseAttendance> = report.overall.iter().chain(&report.courses).cloned().collect();
            let stored = if refresh { cache.refresh(&rows) } else { cache.store(&rows) };
            if let Err(err) = stored {
                warn!(%err, "could not update attendance cache");
            }
            Ok(report)
        }
        Err(PortalError::Network(err)) if !cache.is_empty() => {
            warn!(%err, "showing cached attendance");
            eprintln!("Offline: showing the last saved attendance");
            Ok(AttendanceReport::from(cache.courses().cloned().collect::<Vec<_>>()))
        }
        Err(err) => Err(err),
    }
}

fn find_course<'a>(report: &'a AttendanceReport, code: &str) -> Result<&'a CourseAttendance> {
    let found = report
        .courses
        .iter()
        .find(|c| c.cdata.course_code.eq_ignore_ascii_case(code));

    match found {
        Some(course) => {
            info!(course = %course.cdata.course_code, "showing attendance records");
            Ok(course)
        }
        None => Err(PortalError::Validation(format!("No course with code {code}"))),
    }
}
