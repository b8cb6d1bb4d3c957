#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::{Datelike, Weekday};
use clap::{Parser, Subcommand};
use permanence::{
    generator::{CannedCompletion, CompletionClient, HttpClientConfig, HttpCompletionClient},
    io,
    model::{
        Board, LeaveKind, LeaveRequest, LeaveStatus, Role, RoleId, ShiftId, ShiftWindow, Slot,
        StaffId,
    },
    rules::{self, ConstraintRules},
    storage::{JsonStorage, Storage},
    DayOffsets, DragSubject, DropTarget, EditOutcome, GenerationRequest, ScheduleGenerator,
    Session, ValidatorOptions,
};
use std::time::Duration;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification des permanences support
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du board (équipe, rôles, congés, shifts)
    #[arg(long, global = true, default_value = "board.json")]
    board: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer l'équipe depuis un CSV
    ImportStaff {
        #[arg(long)]
        csv: String,
    },

    /// Importer des congés depuis un CSV
    ImportLeave {
        #[arg(long)]
        csv: String,
    },

    /// Ajouter ou mettre à jour un rôle
    AddRole {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        /// Agents requis par heure d'ouverture
        #[arg(long, default_value_t = 1)]
        required: u32,
    },

    /// Enregistrer un congé
    AddLeave {
        #[arg(long)]
        staff: String,
        /// sick, vacation, medical, personal, emergency, maternity, paternity
        #[arg(long, value_parser = parse_leave_kind)]
        kind: LeaveKind,
        /// YYYY-MM-DD (inclus)
        #[arg(long)]
        start: String,
        /// YYYY-MM-DD (inclus)
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "approved", value_parser = parse_leave_status)]
        status: LeaveStatus,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Supprimer un membre (et ses shifts)
    RemoveStaff {
        #[arg(long)]
        staff: String,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        out_csv: Option<String>,
        /// Signale les shifts posés sur un congé approuvé (semaine du dimanche donné)
        #[arg(long)]
        week_start: Option<String>,
    },

    /// Glisser un membre sur un slot vide
    Assign {
        #[arg(long)]
        staff: String,
        #[command(flatten)]
        slot: SlotArgs,
    },

    /// Glisser un membre sur un shift existant
    Replace {
        #[arg(long)]
        staff: String,
        #[arg(long)]
        shift: String,
    },

    /// Glisser un shift sur un autre shift
    Swap {
        #[arg(long)]
        shift: String,
        #[arg(long)]
        with: String,
    },

    /// Glisser un shift sur un slot vide
    Move {
        #[arg(long)]
        shift: String,
        #[command(flatten)]
        slot: SlotArgs,
    },

    /// Lâcher un shift hors de la grille
    Delete {
        #[arg(long)]
        shift: String,
    },

    /// Générer les shifts des jours demandés via le service de complétion
    Generate(GenerateArgs),
}

#[derive(clap::Args, Debug)]
struct SlotArgs {
    /// 0 = dimanche .. 6 = samedi
    #[arg(long)]
    day: u8,
    #[arg(long)]
    role: String,
    /// HH:MM-HH:MM
    #[arg(long, default_value = "09:00-18:00")]
    window: String,
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Dimanche de la semaine (YYYY-MM-DD)
    #[arg(long)]
    week_start: String,
    /// Jours à générer, ex. "1,2" (vide = semaine complète)
    #[arg(long, default_value = "")]
    days: String,
    /// Fichier texte de règles remplaçant les règles par défaut
    #[arg(long)]
    rules_file: Option<String>,
    #[arg(long, env = "PERMANENCE_ENDPOINT")]
    endpoint: Option<String>,
    #[arg(long, env = "PERMANENCE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Rejoue une complétion enregistrée au lieu d'appeler le service
    #[arg(long, conflicts_with = "endpoint")]
    replay: Option<String>,
    /// Plafond de jours travaillés revérifié après génération
    #[arg(long)]
    max_workdays: Option<u8>,
    /// Écarte les shifts au-delà du besoin du rôle
    #[arg(long)]
    enforce_coverage: bool,
    /// Affiche le prompt sans appeler le service
    #[arg(long)]
    print_prompt: bool,
    /// Affiche la réponse complète en JSON
    #[arg(long)]
    json: bool,
}

fn parse_leave_kind(raw: &str) -> Result<LeaveKind, String> {
    raw.parse()
}

fn parse_leave_status(raw: &str) -> Result<LeaveStatus, String> {
    raw.parse()
}

fn parse_week_start(raw: &str) -> Result<chrono::NaiveDate> {
    let date = io::parse_date(raw)?;
    if date.weekday() != Weekday::Sun {
        bail!("week start must be a Sunday: {raw}");
    }
    Ok(date)
}

fn resolve_staff(board: &Board, raw: &str) -> Result<StaffId> {
    let id = StaffId::new(raw);
    board
        .find_staff(&id)
        .map(|s| s.id.clone())
        .with_context(|| format!("unknown staff: {raw}"))
}

fn resolve_slot(board: &Board, args: &SlotArgs) -> Result<Slot> {
    let role = RoleId::new(&args.role);
    if board.find_role(&role).is_none() {
        bail!("unknown role: {}", args.role);
    }
    let window: ShiftWindow = args.window.parse()?;
    Ok(Slot::new(args.day, role, window)?)
}

fn report(outcome: &EditOutcome) -> i32 {
    match outcome {
        EditOutcome::Created(id) => println!("created {id}"),
        EditOutcome::Replaced(id) => println!("replaced staff on {id}"),
        EditOutcome::Swapped(a, b) => println!("swapped staff between {a} and {b}"),
        EditOutcome::Moved(id) => println!("moved {id}"),
        EditOutcome::Deleted(shift) => println!("deleted {}", shift.id),
        EditOutcome::NoOp(reason) => {
            eprintln!("no change: {reason:?}");
            // Code 2 = WARNING/INCOMPLETE
            return 2;
        }
    }
    0
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.board)?;
    let mut session = Session::new(storage.load_or_default()?);

    let code = match cli.cmd {
        Commands::ImportStaff { csv } => {
            let staff = io::import_staff_csv(csv)?;
            let count = staff.len();
            for member in staff {
                session.board_mut().upsert_staff(member);
            }
            storage.save(session.board())?;
            println!("imported {count} staff member(s)");
            0
        }
        Commands::ImportLeave { csv } => {
            let leaves = io::import_leave_csv(csv)?;
            for leave in &leaves {
                resolve_staff(session.board(), leave.staff_id.as_str())?;
            }
            let count = leaves.len();
            session.board_mut().leave_requests.extend(leaves);
            storage.save(session.board())?;
            println!("imported {count} leave request(s)");
            0
        }
        Commands::AddRole { id, name, required } => {
            session.board_mut().upsert_role(Role {
                id: RoleId::new(id),
                name,
                required_agents: required,
            });
            storage.save(session.board())?;
            0
        }
        Commands::AddLeave {
            staff,
            kind,
            start,
            end,
            status,
            reason,
        } => {
            let staff = resolve_staff(session.board(), &staff)?;
            let (start, end) = (io::parse_date(&start)?, io::parse_date(&end)?);
            let mut leave = LeaveRequest::new(staff, kind, start, end, status)
                .map_err(anyhow::Error::msg)?;
            leave.reason = reason;
            println!("leave {} recorded", leave.id);
            session.board_mut().leave_requests.push(leave);
            storage.save(session.board())?;
            0
        }
        Commands::RemoveStaff { staff } => {
            let id = StaffId::new(&staff);
            let removed = session
                .board_mut()
                .remove_staff(&id)
                .with_context(|| format!("unknown staff: {staff}"))?;
            storage.save(session.board())?;
            println!("removed {staff} and {removed} shift(s)");
            0
        }
        Commands::List {
            out_csv,
            week_start,
        } => {
            let board = session.board();
            if let Some(path) = out_csv {
                io::export_shifts_csv(path, board)?;
            }
            let mut shifts: Vec<_> = board.shifts.iter().collect();
            shifts.sort_by(|a, b| {
                (a.day, a.start_time, &a.role_id).cmp(&(b.day, b.start_time, &b.role_id))
            });
            // impression compacte
            for s in shifts {
                let name = board
                    .find_staff(&s.staff_id)
                    .map(|p| p.name.as_str())
                    .unwrap_or("-");
                println!(
                    "{} | day {} | {} | {} | {} ({})",
                    s.id,
                    s.day,
                    s.window(),
                    s.role_id,
                    s.staff_id,
                    name
                );
            }
            match week_start {
                Some(raw) => {
                    let conflicts = board.leave_conflicts(parse_week_start(&raw)?);
                    for s in &conflicts {
                        eprintln!("leave conflict: {} ({} on day {})", s.id, s.staff_id, s.day);
                    }
                    if conflicts.is_empty() {
                        0
                    } else {
                        2
                    }
                }
                None => 0,
            }
        }
        Commands::Assign { staff, slot } => {
            let subject = DragSubject::Staff(resolve_staff(session.board(), &staff)?);
            let target = DropTarget::EmptySlot(resolve_slot(session.board(), &slot)?);
            let outcome = session.drag(subject, target);
            storage.save(session.board())?;
            report(&outcome)
        }
        Commands::Replace { staff, shift } => {
            let subject = DragSubject::Staff(resolve_staff(session.board(), &staff)?);
            let outcome = session.drag(subject, DropTarget::Shift(ShiftId::new(shift)));
            storage.save(session.board())?;
            report(&outcome)
        }
        Commands::Swap { shift, with } => {
            let outcome = session.drag(
                DragSubject::Shift(ShiftId::new(shift)),
                DropTarget::Shift(ShiftId::new(with)),
            );
            storage.save(session.board())?;
            report(&outcome)
        }
        Commands::Move { shift, slot } => {
            let target = DropTarget::EmptySlot(resolve_slot(session.board(), &slot)?);
            let outcome = session.drag(DragSubject::Shift(ShiftId::new(shift)), target);
            storage.save(session.board())?;
            report(&outcome)
        }
        Commands::Delete { shift } => {
            let outcome =
                session.drag(DragSubject::Shift(ShiftId::new(shift)), DropTarget::Nowhere);
            storage.save(session.board())?;
            report(&outcome)
        }
        Commands::Generate(args) => generate(&mut session, &storage, args).await?,
    };

    std::process::exit(code);
}

async fn generate(
    session: &mut Session,
    storage: &JsonStorage,
    args: GenerateArgs,
) -> Result<i32> {
    let week_start = parse_week_start(&args.week_start)?;
    let days: DayOffsets = args.days.parse()?;
    let rules = match &args.rules_file {
        Some(path) => rules::load_rules_file(path)?,
        None => ConstraintRules::Default,
    };
    let request = GenerationRequest {
        days,
        week_start,
        rules,
    };

    if args.print_prompt {
        let input = permanence::GenerationInput::from_board(
            session.board(),
            request.days.clone(),
            request.week_start,
            request.rules.clone(),
        );
        print!("{}", permanence::generator::build_prompt(&input));
        return Ok(0);
    }

    let client: Box<dyn CompletionClient> = match (&args.replay, &args.endpoint) {
        (Some(path), _) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading completion {path}"))?;
            Box::new(CannedCompletion::new(text))
        }
        (None, Some(endpoint)) => {
            let mut config = HttpClientConfig::new(endpoint.clone());
            config.api_key = args.api_key.clone();
            config.timeout = args.timeout_secs.map(Duration::from_secs);
            Box::new(HttpCompletionClient::new(config)?)
        }
        (None, None) => {
            bail!("no completion endpoint: use --endpoint, PERMANENCE_ENDPOINT or --replay")
        }
    };
    let generator = ScheduleGenerator::new(client).with_options(ValidatorOptions {
        max_workdays: args.max_workdays,
        enforce_coverage: args.enforce_coverage,
    });

    let response = session.generate(&generator, request).await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }
    let Some(data) = response.data.as_ref().filter(|_| response.success) else {
        bail!(response
            .error
            .unwrap_or_else(|| "generation failed".to_string()));
    };

    if !args.json {
        println!("{}", data.reasoning);
    }
    if data.degraded {
        return Ok(2);
    }
    if let Some(merge) = response.merge {
        println!(
            "merged: {} inserted, {} removed, {} discarded, {} rejected by validation",
            merge.inserted, merge.removed, merge.discarded, data.rejected_count
        );
    }
    storage.save(session.board())?;
    Ok(0)
}
