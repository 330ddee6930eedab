//! Command-line front end.
//!
//! Parses commands with clap and runs them against the application
//! services. Passwords are read from the first line of stdin so they never
//! appear in argument lists or shell history.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use zeroize::Zeroizing;

use crate::adapters::StorageError;
use crate::application::{AssessmentService, AuthService, DashboardService, Submission};
use crate::domain::{
    AssessmentError, AssessmentRecord, BmiCategory, FactorFlags, Gender, PatientMeasurements, User,
};
use crate::ports::{PersistenceGateway, SessionStore};
use crate::{GlycoError, Result};

#[derive(Debug, Parser)]
#[command(name = "glycocheck", version, about = "Diabetes risk questionnaire")]
pub struct Cli {
    #[arg(long, global = true, help = "SQLite database path (overrides GLYCOCHECK_DB_PATH)")]
    pub db: Option<PathBuf>,

    #[arg(long, global = true, help = "Session file path (overrides GLYCOCHECK_SESSION_FILE)")]
    pub session: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an account (password on stdin)
    Signup(SignupArgs),
    /// Log in (password on stdin)
    Login(LoginArgs),
    /// Log out and forget the saved session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Fill in the risk questionnaire and save the result
    Assess(AssessArgs),
    /// Show the current saved assessment
    Show(OutputArgs),
    /// List past submissions, newest first
    History(HistoryArgs),
    /// Summary cards, factor breakdown and trends
    Dashboard(OutputArgs),
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    #[arg(long, default_value_t = false, help = "Print JSON instead of text")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[arg(long, help = "Maximum entries (defaults to GLYCOCHECK_HISTORY_LIMIT)")]
    pub limit: Option<usize>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct AssessArgs {
    #[arg(long, help = "Age in years (1-120)")]
    pub age: i32,

    #[arg(long, help = "male, female or other")]
    pub gender: Gender,

    #[arg(long, help = "Resting pulse in bpm (40-200)")]
    pub pulse_rate: i32,

    #[arg(long, help = "Systolic blood pressure in mmHg")]
    pub systolic: i32,

    #[arg(long, help = "Diastolic blood pressure in mmHg")]
    pub diastolic: i32,

    #[arg(long, help = "Fasting glucose in mg/dL")]
    pub glucose: i32,

    #[arg(long, help = "Height in cm (100-250)")]
    pub height: i32,

    #[arg(long, help = "Weight in kg (20-300)")]
    pub weight: i32,

    #[arg(long, default_value_t = false)]
    pub family_diabetes: bool,

    #[arg(long, default_value_t = false)]
    pub hypertensive: bool,

    #[arg(long, default_value_t = false)]
    pub family_hypertension: bool,

    #[arg(long, default_value_t = false)]
    pub cardiovascular: bool,

    #[arg(long, default_value_t = false)]
    pub stroke: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl AssessArgs {
    #[must_use]
    pub fn measurements(&self) -> PatientMeasurements {
        PatientMeasurements {
            age: self.age,
            gender: self.gender,
            pulse_rate: self.pulse_rate,
            systolic_bp: self.systolic,
            diastolic_bp: self.diastolic,
            glucose: self.glucose,
            height: self.height,
            weight: self.weight,
            family_diabetes: self.family_diabetes,
            hypertensive: self.hypertensive,
            family_hypertension: self.family_hypertension,
            cardiovascular_disease: self.cardiovascular,
            stroke: self.stroke,
        }
    }
}

fn read_password<R: BufRead>(input: &mut R) -> Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    input.read_line(&mut line)?;
    let password = Zeroizing::new(line.trim_end_matches(['\n', '\r']).to_string());
    if password.is_empty() {
        return Err(GlycoError::Validation(vec!["Password must be provided on stdin".to_string()]));
    }
    Ok(password)
}

fn write_factors<W: Write>(out: &mut W, factors: &FactorFlags) -> Result<()> {
    let rows = [
        ("High BMI", factors.high_bmi),
        ("High glucose", factors.high_glucose),
        ("High blood pressure", factors.high_bp),
        ("Family history of diabetes", factors.family_history),
        ("Cardiovascular disease", factors.cardiovascular),
        ("Age 45 or over", factors.age_risk),
    ];
    writeln!(out, "Risk factors:")?;
    for (label, present) in rows {
        writeln!(out, "  [{}] {label}", if present { "x" } else { " " })?;
    }
    Ok(())
}

fn write_record<W: Write>(out: &mut W, record: &AssessmentRecord) -> Result<()> {
    let m = &record.measurements;
    writeln!(out, "Risk level: {} (score {}/100)", record.risk_level, record.risk_score)?;
    writeln!(out, "{}", record.risk_level.description())?;
    writeln!(out, "BMI: {:.1} kg/m² ({})", record.bmi, BmiCategory::from_bmi(record.bmi))?;
    writeln!(out, "Glucose: {} mg/dL", m.glucose)?;
    writeln!(out, "Blood pressure: {}/{} mmHg", m.systolic_bp, m.diastolic_bp)?;
    write_factors(out, &record.factors)?;
    writeln!(out, "Saved: {}", record.updated_at.format("%Y-%m-%d %H:%M UTC"))?;
    Ok(())
}

/// Services wired to one gateway and session store.
pub struct App<G, S>
where
    G: PersistenceGateway,
    S: SessionStore,
{
    auth: AuthService<G, S>,
    assessments: AssessmentService<G>,
    dashboard: DashboardService<G>,
    history_limit: usize,
}

impl<G, S> App<G, S>
where
    G: PersistenceGateway,
    S: SessionStore,
    G::Error: Into<StorageError>,
{
    pub fn new(gateway: Arc<G>, session: Arc<S>, history_limit: usize) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&gateway), session),
            assessments: AssessmentService::new(Arc::clone(&gateway)),
            dashboard: DashboardService::new(gateway),
            history_limit,
        }
    }

    /// Run one command, reading secrets from `input` and writing results to `out`.
    ///
    /// # Errors
    /// Returns the command's error unchanged.
    pub fn execute<R, W>(&self, command: Commands, input: &mut R, out: &mut W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        match command {
            Commands::Signup(args) => {
                let password = read_password(input)?;
                let user = self.auth.signup(&args.email, &password, &args.name)?;
                writeln!(out, "Account created for {}. You can now log in.", user.email)?;
            }
            Commands::Login(args) => {
                let password = read_password(input)?;
                let user = self.auth.login(&args.email, &password)?;
                writeln!(out, "Welcome back, {}", user.full_name)?;
            }
            Commands::Logout => {
                self.auth.logout()?;
                writeln!(out, "Logged out")?;
            }
            Commands::Whoami => match self.auth.refresh()? {
                Some(user) => writeln!(out, "Logged in as {} <{}>", user.full_name, user.email)?,
                None => writeln!(out, "Not logged in")?,
            },
            Commands::Assess(args) => self.assess(&args, out)?,
            Commands::Show(args) => {
                let user = self.require_user()?;
                match self.assessments.current(&user)? {
                    Some(record) if args.json => {
                        serde_json::to_writer_pretty(&mut *out, &record)?;
                        writeln!(out)?;
                    }
                    Some(record) => write_record(out, &record)?,
                    None => writeln!(out, "No assessment yet. Run `glycocheck assess` first.")?,
                }
            }
            Commands::History(args) => {
                let user = self.require_user()?;
                let records = self
                    .assessments
                    .history(&user, args.limit.unwrap_or(self.history_limit))?;
                if args.json {
                    serde_json::to_writer_pretty(&mut *out, &records)?;
                    writeln!(out)?;
                } else if records.is_empty() {
                    writeln!(out, "No submissions yet")?;
                } else {
                    for r in &records {
                        writeln!(
                            out,
                            "{}  score {:>3} ({})  glucose {}  BMI {:.1}  BP {}/{}",
                            r.updated_at.format("%Y-%m-%d %H:%M"),
                            r.risk_score,
                            r.risk_level,
                            r.measurements.glucose,
                            r.bmi,
                            r.measurements.systolic_bp,
                            r.measurements.diastolic_bp,
                        )?;
                    }
                }
            }
            Commands::Dashboard(args) => {
                let user = self.auth.current_user()?;
                let summary = self.dashboard.summary(user.as_ref(), self.history_limit)?;
                if args.json {
                    serde_json::to_writer_pretty(&mut *out, &summary)?;
                    writeln!(out)?;
                } else {
                    writeln!(out, "Welcome back, {}", summary.user_name)?;
                    for card in &summary.cards {
                        writeln!(
                            out,
                            "{:<15} {:>7} {:<6} {}",
                            card.title, card.value, card.unit, card.description
                        )?;
                    }
                    if !summary.factors.is_empty() {
                        writeln!(out, "Risk factor analysis:")?;
                        for f in &summary.factors {
                            writeln!(out, "  {:<20} {:>5.1}%", f.name, f.percent)?;
                        }
                    }
                    if summary.trend.len() > 1 {
                        writeln!(out, "Trend over {} submissions:", summary.trend.len())?;
                        for p in &summary.trend {
                            writeln!(
                                out,
                                "  {}  glucose {}  BMI {:.1}  score {}",
                                p.submitted_at.format("%Y-%m-%d"),
                                p.glucose,
                                p.bmi,
                                p.risk_score
                            )?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn require_user(&self) -> Result<User> {
        self.auth
            .current_user()?
            .ok_or_else(|| AssessmentError::NotAuthenticated.into())
    }

    fn assess<W: Write>(&self, args: &AssessArgs, out: &mut W) -> Result<()> {
        let measurements = args.measurements();
        measurements.validate().map_err(GlycoError::Validation)?;

        let identity = self.auth.current_user()?;
        let Submission { record, .. } = self.assessments.submit(identity.as_ref(), measurements)?;

        if let Some(user) = identity.as_ref() {
            self.auth.mark_assessment_complete(user)?;
        }

        if args.json {
            serde_json::to_writer_pretty(&mut *out, &record)?;
            writeln!(out)?;
        } else {
            write_record(out, &record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MemorySessionStore, SqliteGateway};

    fn create_test_app() -> App<SqliteGateway, MemorySessionStore> {
        let gateway = Arc::new(SqliteGateway::in_memory().expect("Should create db"));
        App::new(gateway, Arc::new(MemorySessionStore::new()), 12)
    }

    fn run(app: &App<SqliteGateway, MemorySessionStore>, args: &[&str], stdin: &str) -> Result<String> {
        let cli = Cli::parse_from(std::iter::once("glycocheck").chain(args.iter().copied()));
        let mut input = stdin.as_bytes();
        let mut out = Vec::new();
        app.execute(cli.command, &mut input, &mut out)?;
        Ok(String::from_utf8(out).expect("Should be utf8"))
    }

    const HIGH_RISK: &[&str] = &[
        "assess", "--age", "50", "--gender", "male", "--pulse-rate", "80", "--systolic", "145",
        "--diastolic", "95", "--glucose", "130", "--height", "170", "--weight", "90",
        "--family-diabetes", "--hypertensive",
    ];

    #[test]
    fn test_parse_assess_flags() {
        let cli = Cli::parse_from(std::iter::once("glycocheck").chain(HIGH_RISK.iter().copied()));
        match cli.command {
            Commands::Assess(args) => {
                let m = args.measurements();
                assert_eq!(m.gender, Gender::Male);
                assert!(m.family_diabetes && m.hypertensive);
                assert!(!m.stroke);
            }
            _ => panic!("expected assess command"),
        }
    }

    #[test]
    fn test_every_command_has_help_text() {
        use clap::CommandFactory;

        let command = Cli::command();
        for sub in command.get_subcommands() {
            assert!(sub.get_about().is_some(), "{} has no description", sub.get_name());
        }
        assert!(command.find_subcommand("logout").is_some());
    }

    #[test]
    fn test_assess_requires_login() {
        let app = create_test_app();
        let err = run(&app, HIGH_RISK, "").expect_err("Should fail");
        assert!(err.is_not_authenticated());
    }

    #[test]
    fn test_full_flow() {
        let app = create_test_app();

        let out = run(&app, &["signup", "--email", "pat@example.com", "--name", "Pat"], "open-sesame-42\n")
            .expect("Should sign up");
        assert!(out.contains("Account created"));

        run(&app, &["login", "--email", "pat@example.com"], "open-sesame-42\n").expect("Should log in");

        let out = run(&app, HIGH_RISK, "").expect("Should assess");
        assert!(out.contains("Risk level: High (score 100/100)"));
        assert!(out.contains("[x] High BMI"));
        assert!(out.contains("[ ] Cardiovascular disease"));

        let out = run(&app, &["whoami"], "").expect("Should run");
        assert!(out.contains("Pat <pat@example.com>"));

        let json = run(&app, &["show", "--json"], "").expect("Should show");
        let value: serde_json::Value = serde_json::from_str(&json).expect("Should be JSON");
        assert_eq!(value["riskLevel"], "High");
        assert_eq!(value["riskScore"], 100);

        let out = run(&app, &["dashboard"], "").expect("Should render");
        assert!(out.contains("Welcome back, Pat"));
        assert!(out.contains("Risk factor analysis:"));

        run(&app, &["logout"], "").expect("Should log out");
        let out = run(&app, &["whoami"], "").expect("Should run");
        assert_eq!(out, "Not logged in\n");
    }

    #[test]
    fn test_out_of_range_input_rejected() {
        let app = create_test_app();
        run(&app, &["signup", "--email", "pat@example.com", "--name", "Pat"], "open-sesame-42\n")
            .expect("Should sign up");
        run(&app, &["login", "--email", "pat@example.com"], "open-sesame-42\n").expect("Should log in");

        let args = [
            "assess", "--age", "130", "--gender", "female", "--pulse-rate", "80", "--systolic",
            "120", "--diastolic", "80", "--glucose", "90", "--height", "170", "--weight", "60",
        ];
        let err = run(&app, &args, "").expect_err("Should reject");
        assert!(matches!(err, GlycoError::Validation(_)));
    }

    #[test]
    fn test_empty_password_rejected() {
        let app = create_test_app();
        let err = run(&app, &["login", "--email", "pat@example.com"], "\n").expect_err("Should reject");
        assert!(matches!(err, GlycoError::Validation(_)));
    }
}
