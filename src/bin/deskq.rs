//! deskq CLI: operator interface to the admissions queue.

use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use deskq::config::Config;
use deskq::model::{NewTicket, Staff, Ticket, TicketFilter, TicketId, TicketStatus, TicketUpdate};
use deskq::telemetry::{TelemetryConfig, init_telemetry};
use deskq::{CallOutcome, Engine};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "deskq", about = "Admissions office visitor queue")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Applicant tickets
    Ticket {
        #[command(subcommand)]
        action: TicketAction,
    },
    /// Staff roster and desk actions
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
    /// Numbering, archive, and event stream
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum TicketAction {
    /// Register an applicant
    Register {
        full_name: String,
        phone: String,
        /// Program code (repeatable)
        #[arg(long = "program", required = true)]
        programs: Vec<String>,
        #[arg(long)]
        note: Option<String>,
        /// Announcement language: ru, kk, en
        #[arg(long)]
        language: Option<String>,
    },
    /// Queue position for an applicant name
    Status { full_name: String },
    /// Cancel a ticket by ID
    Cancel {
        /// Ticket ID (full UUID or prefix)
        id: String,
        /// Only cancel if the ticket belongs to this phone
        #[arg(long)]
        phone: Option<String>,
    },
    /// Cancel the active ticket for a phone number
    CancelPhone { phone: String },
    /// Move a waiting ticket to the end of the queue
    MoveBack { id: String },
    /// Edit a ticket
    Update {
        id: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Replace the program list (repeatable)
        #[arg(long = "program")]
        programs: Vec<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        language: Option<String>,
        /// waiting, paused, or cancelled
        #[arg(long)]
        status: Option<String>,
    },
    /// Remove a ticket from the live queue (kept in the archive)
    Delete { id: String },
    /// List tickets
    List {
        #[arg(long)]
        status: Option<String>,
        /// Creation day, YYYY-MM-DD (UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Substring of the staff name
        #[arg(long)]
        staff: Option<String>,
        /// Substring of the applicant name
        #[arg(long)]
        name: Option<String>,
        /// Program code or name in any language
        #[arg(long)]
        program: Option<String>,
    },
}

#[derive(Subcommand)]
enum StaffAction {
    /// Add a staff member
    Add {
        name: String,
        #[arg(long)]
        desk: Option<String>,
    },
    /// List staff
    List,
    /// Change a staff member's desk
    SetDesk {
        /// Staff ID or exact name
        staff: String,
        /// Omit to clear
        desk: Option<String>,
    },
    /// Remove a staff member
    Remove { staff: String },
    /// Begin a shift
    Start { staff: String },
    /// Take a break
    Pause { staff: String },
    /// Return from a break
    Resume { staff: String },
    /// End a shift, completing any in-progress ticket
    Finish { staff: String },
    /// Call the next waiting applicant
    CallNext { staff: String },
    /// Complete the applicant being served
    Complete { staff: String },
    /// Tickets assigned to a staff member
    Queue {
        staff: String,
        #[arg(long)]
        status: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Archive all finished tickets and renumber the queue
    Reset,
    /// Archive finished tickets older than a number of days
    Purge {
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// Write archive rows for live tickets that lack one
    BackfillArchive,
    /// Archive totals
    Stats,
    /// Hall display: tickets being served and the waiting count
    Display,
    /// Event stream since a sequence number
    Events {
        #[arg(long, default_value_t = 0)]
        since: u64,
    },
    /// Archive rows, newest first
    Archive {
        /// Show one ticket's archive row
        #[arg(long)]
        id: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig::from_config(&config))?;

    let mut engine = Engine::from_config(&config)?;
    let out = Output { json: cli.json };

    match cli.command {
        Command::Ticket { action } => cmd_ticket(&mut engine, &out, action),
        Command::Staff { action } => cmd_staff(&mut engine, &out, action),
        Command::Admin { action } => cmd_admin(&mut engine, &out, action),
    }
}

fn cmd_ticket(engine: &mut Engine, out: &Output, action: TicketAction) -> anyhow::Result<()> {
    match action {
        TicketAction::Register {
            full_name,
            phone,
            programs,
            note,
            language,
        } => {
            let mut new = NewTicket::new(full_name, phone).programs(programs);
            if let Some(note) = note {
                new = new.note(note);
            }
            if let Some(language) = language {
                new = new.language(language);
            }
            let ticket = engine.register(new)?;
            out.ticket(&ticket)
        }
        TicketAction::Status { full_name } => {
            let report = engine.check_status(&full_name)?;
            out.emit(&report, || {
                print_ticket(&report.ticket);
                match (report.position, report.estimated_wait_minutes) {
                    (Some(position), Some(wait)) => {
                        println!("Position:   {position}");
                        println!("Ahead:      {}", report.people_ahead.unwrap_or(0));
                        println!("Est. wait:  {wait} min");
                    }
                    _ => println!("Position:   -"),
                }
            })
        }
        TicketAction::Cancel { id, phone } => {
            let id = resolve_ticket(engine, &id)?;
            let ticket = engine.cancel(id, phone.as_deref())?;
            out.ticket(&ticket)
        }
        TicketAction::CancelPhone { phone } => {
            let ticket = engine.cancel_by_phone(&phone)?;
            out.ticket(&ticket)
        }
        TicketAction::MoveBack { id } => {
            let id = resolve_ticket(engine, &id)?;
            let report = engine.move_to_back(id)?;
            out.emit(&report, || {
                println!(
                    "Moved to #{} (position {})",
                    report.ticket.seq_no,
                    report.position.unwrap_or(0)
                );
            })
        }
        TicketAction::Update {
            id,
            full_name,
            phone,
            programs,
            note,
            language,
            status,
        } => {
            let id = resolve_ticket(engine, &id)?;
            let update = TicketUpdate {
                full_name,
                phone,
                programs: (!programs.is_empty()).then_some(programs),
                notes: note,
                language,
                status: status.map(|s| s.parse()).transpose()?,
            };
            let ticket = engine.update(id, update)?;
            out.ticket(&ticket)
        }
        TicketAction::Delete { id } => {
            let id = resolve_ticket(engine, &id)?;
            engine.delete_ticket(id)?;
            out.emit(&serde_json::json!({ "deleted": id }), || {
                println!("Deleted {id}");
            })
        }
        TicketAction::List {
            status,
            date,
            staff,
            name,
            program,
        } => {
            let filter = TicketFilter {
                status: status.map(|s| s.parse::<TicketStatus>()).transpose()?,
                date,
                staff_id: None,
                staff_name: staff,
                applicant_name: name,
                program,
            };
            let tickets = engine.list(&filter)?;
            out.tickets(&tickets)
        }
    }
}

fn cmd_staff(engine: &mut Engine, out: &Output, action: StaffAction) -> anyhow::Result<()> {
    match action {
        StaffAction::Add { name, desk } => {
            let staff = engine.add_staff(&name, desk.as_deref())?;
            out.staff(&staff)
        }
        StaffAction::List => {
            let staff = engine.list_staff()?;
            out.emit(&staff, || {
                println!("{:<8}  {:<24}  {:<8}  STATUS", "ID", "NAME", "DESK");
                println!("{}", "-".repeat(56));
                for s in &staff {
                    println!(
                        "{:<8}  {:<24}  {:<8}  {}",
                        &s.id.to_string()[..8],
                        s.name,
                        s.desk.as_deref().unwrap_or("-"),
                        s.status
                    );
                }
            })
        }
        StaffAction::SetDesk { staff, desk } => {
            let id = engine.resolve_staff(&staff)?.id;
            let staff = engine.set_desk(id, desk.as_deref())?;
            out.staff(&staff)
        }
        StaffAction::Remove { staff } => {
            let member = engine.resolve_staff(&staff)?;
            engine.remove_staff(member.id)?;
            out.emit(&serde_json::json!({ "removed": member.id }), || {
                println!("Removed {}", member.name);
            })
        }
        StaffAction::Start { staff } => {
            let id = engine.resolve_staff(&staff)?.id;
            let staff = engine.start_work(id)?;
            out.staff(&staff)
        }
        StaffAction::Pause { staff } => {
            let id = engine.resolve_staff(&staff)?.id;
            let staff = engine.pause_work(id)?;
            out.staff(&staff)
        }
        StaffAction::Resume { staff } => {
            let id = engine.resolve_staff(&staff)?.id;
            let staff = engine.resume_work(id)?;
            out.staff(&staff)
        }
        StaffAction::Finish { staff } => {
            let id = engine.resolve_staff(&staff)?.id;
            let staff = engine.finish_work(id)?;
            out.staff(&staff)
        }
        StaffAction::CallNext { staff } => {
            let id = engine.resolve_staff(&staff)?.id;
            let outcome = engine.call_next(id)?;
            out.emit(&outcome, || match &outcome {
                CallOutcome::Called {
                    ticket,
                    announcement,
                } => {
                    print_ticket(ticket);
                    println!("Announce:   {}", announcement.text);
                }
                CallOutcome::EmptyQueue => println!("No waiting applicants."),
            })
        }
        StaffAction::Complete { staff } => {
            let id = engine.resolve_staff(&staff)?.id;
            let staff = engine.complete_current(id)?;
            out.staff(&staff)
        }
        StaffAction::Queue { staff, status } => {
            let id = engine.resolve_staff(&staff)?.id;
            let status = status.map(|s| s.parse::<TicketStatus>()).transpose()?;
            let tickets = engine.staff_queue(id, status)?;
            out.tickets(&tickets)
        }
    }
}

fn cmd_admin(engine: &mut Engine, out: &Output, action: AdminAction) -> anyhow::Result<()> {
    match action {
        AdminAction::Reset => {
            let report = engine.reset_numbering()?;
            out.emit(&report, || {
                println!(
                    "Archived {}, skipped {}, renumbered {}",
                    report.archived.len(),
                    report.skipped.len(),
                    report.renumbered
                );
            })
        }
        AdminAction::Purge { days } => {
            let cutoff = Utc::now() - Duration::days(days);
            let report = engine.purge_completed_before(cutoff)?;
            out.emit(&report, || {
                println!(
                    "Archived {} ticket(s) finished before {}",
                    report.archived.len(),
                    cutoff.format("%Y-%m-%d %H:%M")
                );
            })
        }
        AdminAction::BackfillArchive => {
            let written = engine.backfill_archive()?;
            out.emit(&serde_json::json!({ "written": written }), || {
                println!("Wrote {written} archive row(s)");
            })
        }
        AdminAction::Stats => {
            let stats = engine.archive_statistics()?;
            out.emit(&stats, || {
                println!("Archived:   {}", stats.total_archived);
                for (reason, n) in &stats.by_reason {
                    println!("  {reason:<18} {n}");
                }
                println!("By status:");
                for (status, n) in &stats.by_status {
                    println!("  {status:<18} {n}");
                }
                println!(
                    "Live queue: {}/{}",
                    stats.current_queue_size, stats.queue_limit
                );
            })
        }
        AdminAction::Display => {
            let serving = engine.now_serving()?;
            let waiting = engine.waiting_count()?;
            let board = serde_json::json!({ "serving": serving, "active": waiting });
            out.emit(&board, || {
                for s in &serving {
                    println!(
                        "#{:<4} -> desk {:<6} {}",
                        s.seq_no,
                        s.desk.as_deref().unwrap_or("-"),
                        s.staff_name.as_deref().unwrap_or("-")
                    );
                }
                println!("{waiting} in queue");
            })
        }
        AdminAction::Events { since } => {
            let events = engine.events_since(since)?;
            out.emit(&events, || {
                for e in &events {
                    let kind = serde_json::to_string(&e.kind).unwrap_or_default();
                    println!("{:>6}  {}  {kind}", e.seq, e.timestamp.format("%Y-%m-%d %H:%M:%S"));
                }
            })
        }
        AdminAction::Archive { id, limit } => {
            let rows: Vec<_> = match id {
                Some(id) => {
                    let id: TicketId = id.parse()?;
                    engine.archived(id)?.into_iter().collect()
                }
                None => engine.list_archive(limit)?,
            };
            out.emit(&rows, || {
                println!(
                    "{:<8}  {:<4}  {:<24}  {:<12}  {:<18}  ARCHIVED",
                    "ORIGINAL", "SEQ", "NAME", "STATUS", "REASON"
                );
                println!("{}", "-".repeat(90));
                for r in &rows {
                    println!(
                        "{:<8}  {:<4}  {:<24}  {:<12}  {:<18}  {}",
                        &r.original_id.to_string()[..8],
                        r.seq_no,
                        r.full_name,
                        r.status.as_str(),
                        r.archive_reason.as_str(),
                        r.archived_at.format("%Y-%m-%d %H:%M")
                    );
                }
            })
        }
    }
}

/// Accept a full ticket UUID or a unique prefix of one.
fn resolve_ticket(engine: &Engine, id_str: &str) -> anyhow::Result<TicketId> {
    if id_str.len() >= 36 {
        return Ok(id_str.parse()?);
    }

    let tickets = engine.list(&TicketFilter::default())?;
    let matches: Vec<_> = tickets
        .iter()
        .filter(|t| t.id.to_string().starts_with(id_str))
        .collect();
    match matches.len() {
        0 => anyhow::bail!("no ticket matching prefix '{id_str}'"),
        1 => Ok(matches[0].id),
        n => anyhow::bail!("{n} tickets match prefix '{id_str}', be more specific"),
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text();
        }
        Ok(())
    }

    fn ticket(&self, ticket: &Ticket) -> anyhow::Result<()> {
        self.emit(ticket, || print_ticket(ticket))
    }

    fn staff(&self, staff: &Staff) -> anyhow::Result<()> {
        self.emit(staff, || {
            println!("ID:         {}", staff.id);
            println!("Name:       {}", staff.name);
            println!("Desk:       {}", staff.desk.as_deref().unwrap_or("-"));
            println!("Status:     {}", staff.status);
        })
    }

    fn tickets(&self, tickets: &[Ticket]) -> anyhow::Result<()> {
        self.emit(&tickets, || {
            if tickets.is_empty() {
                println!("No tickets found.");
                return;
            }
            println!(
                "{:<8}  {:<4}  {:<24}  {:<14}  {:<12}  {:<16}  CREATED",
                "ID", "SEQ", "NAME", "PHONE", "STATUS", "STAFF"
            );
            println!("{}", "-".repeat(100));
            for t in tickets {
                println!(
                    "{:<8}  {:<4}  {:<24}  {:<14}  {:<12}  {:<16}  {}",
                    &t.id.to_string()[..8],
                    t.seq_no,
                    t.full_name,
                    t.phone,
                    t.status.as_str(),
                    t.assigned_staff.as_ref().map_or("-", |s| s.name.as_str()),
                    t.created_at.format("%Y-%m-%d %H:%M")
                );
            }
            println!("\n{} ticket(s)", tickets.len());
        })
    }
}

fn print_ticket(ticket: &Ticket) {
    println!("ID:         {}", ticket.id);
    println!("Number:     {}", ticket.seq_no);
    println!("Name:       {}", ticket.full_name);
    println!("Phone:      {}", ticket.phone);
    println!("Programs:   {}", ticket.programs.join(", "));
    println!("Status:     {}", ticket.status);
    if let Some(staff) = &ticket.assigned_staff {
        println!(
            "Staff:      {} (desk {})",
            staff.name,
            staff.desk.as_deref().unwrap_or("-")
        );
    }
    if let Some(notes) = &ticket.notes {
        println!("Notes:      {notes}");
    }
    println!("Created:    {}", ticket.created_at);
    if let Some(started) = ticket.started_at {
        println!("Started:    {started}");
    }
    if let Some(secs) = ticket.processing_secs {
        println!("Processed:  {secs}s");
    }
}
