//! # Idler Costing CLI
//!
//! Line-based front end for `idler_core`.
//!
//! ```text
//! idler_cli              interactive roller and frame costing
//! idler_cli bulk <file>  price every item of a .csv/.xlsx list
//! ```
//!
//! Environment:
//!
//! - `IDLER_CONSTANTS` - `.toml`/`.json` file with cost constant overrides
//! - `IDLER_EXPORT_DIR` - where the costing tables and workbook are written (default `.`)
//! - `RUST_LOG` - log filter (default `info`, logs go to stderr)

mod logging;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use idler_core::bulk_estimate::{PriceSheet, PriceSummary, SubmitOutcome};
use idler_core::calculations::frame::resolve_belt_width;
use idler_core::calculations::{
    compose_set, BeltWidthChoice, FrameCostingRecord, FrameRequest, QuantityMode,
    RollerCostingRecord,
};
use idler_core::catalog::{self, FrameBoMLine, FrameFamily, RollerVariant};
use idler_core::export;
use idler_core::geometry::{RollerDimensions, WeightMethod};
use idler_core::import::read_item_names;
use idler_core::workflow::{current_frame_family, RollerForm};
use idler_core::{step, Action, ConstantKey, CostConstants, Session, Stage, StepEvent};

const RULE: &str = "═══════════════════════════════════════════════════════════";

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => run_interactive(),
        Some("bulk") => match args.get(1) {
            Some(path) => run_bulk(Path::new(path)),
            None => {
                eprintln!("Usage: idler_cli bulk <file.csv|file.xlsx>");
                std::process::exit(2);
            }
        },
        Some("-h") | Some("--help") | Some("help") => print_usage(),
        Some(other) => {
            eprintln!("Unknown command '{}'", other);
            print_usage();
            std::process::exit(2);
        }
    }
}

fn print_usage() {
    println!("Usage:");
    println!("  idler_cli              interactive roller and frame costing");
    println!("  idler_cli bulk <file>  price every item of a .csv/.xlsx list");
}

// ============================================================================
// Prompts
// ============================================================================

/// Read one trimmed line. `None` when stdin is closed.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    io::stdout().flush().ok()?;

    let mut input = String::new();
    match io::stdin().lock().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}

fn prompt_f64(prompt: &str, default: f64) -> Option<f64> {
    read_line(&format!("{} [{}]: ", prompt, default)).map(|s| parse_or(&s, default))
}

fn prompt_u32(prompt: &str, default: u32) -> Option<u32> {
    read_line(&format!("{} [{}]: ", prompt, default)).map(|s| parse_or(&s, default))
}

fn prompt_yes_no(prompt: &str, default: bool) -> Option<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    read_line(&format!("{} [{}]: ", prompt, hint)).map(|s| parse_yes_no(&s, default))
}

/// Blank or unparsable input keeps the default.
fn parse_or<T: std::str::FromStr>(input: &str, default: T) -> T {
    input.trim().parse().unwrap_or(default)
}

fn parse_yes_no(input: &str, default: bool) -> bool {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}

/// Menu number (1-based) or name of a roller variant. Anything else is the
/// unselected placeholder.
fn parse_variant_choice(input: &str) -> Option<RollerVariant> {
    let trimmed = input.trim();
    if let Ok(n) = trimmed.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| RollerVariant::ALL.get(i)).copied();
    }
    RollerVariant::from_str_flexible(trimmed).ok()
}

fn parse_quantity_mode(input: &str) -> QuantityMode {
    match input.trim().to_lowercase().as_str() {
        "s" | "set" | "sets" => QuantityMode::Set,
        _ => QuantityMode::Single,
    }
}

fn parse_weight_method(input: &str) -> WeightMethod {
    match input.trim().to_lowercase().as_str() {
        "h" | "hollow" | "exact" => WeightMethod::HollowCylinder,
        _ => WeightMethod::ThinShell,
    }
}

// ============================================================================
// Interactive costing
// ============================================================================

/// Menu commands available outside the input forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Export,
    Quit,
    Reset,
    Act(char),
}

fn parse_command(input: &str) -> Command {
    match input.trim().to_lowercase().as_str() {
        "e" | "export" => Command::Export,
        "q" | "quit" | "exit" => Command::Quit,
        "r" | "reset" => Command::Reset,
        other => Command::Act(other.chars().next().unwrap_or(' ')),
    }
}

fn load_constants() -> CostConstants {
    let Ok(path) = std::env::var("IDLER_CONSTANTS") else {
        return CostConstants::default();
    };
    match CostConstants::load_from_file(Path::new(&path)) {
        Ok(constants) => constants,
        Err(e) => {
            eprintln!("Could not load constants from {}: {}", path, e);
            eprintln!("Using the baseline constants.");
            CostConstants::default()
        }
    }
}

fn export_dir() -> PathBuf {
    std::env::var("IDLER_EXPORT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

fn run_interactive() {
    println!("Idler Costing - Conveyor Roller and Frame Estimator");
    println!("{}", RULE);

    let mut session = Session::with_constants(load_constants());
    tracing::info!(session = %session.meta.id, "session started");

    loop {
        let action = match session.stage {
            Stage::SelectRoller => select_roller(),
            Stage::AskConstants => prompt_yes_no("Change the cost constants?", false)
                .map(|yes| Some(Action::ChangeConstants(yes))),
            Stage::EditConstants => {
                if !edit_constants(&mut session) {
                    break;
                }
                Some(Some(Action::SaveConstants))
            }
            Stage::Input => roller_form().map(|f| Some(Action::CalculateRoller(f))),
            Stage::Compiled => compiled_menu(&session),
            Stage::FrameInput => frame_form(&session).map(|r| Some(Action::AddFrame(r))),
            Stage::FrameCompiled => frame_compiled_menu(&session),
        };

        // Outer None: stdin closed or quit. Inner None: menu handled it.
        let Some(action) = action else {
            break;
        };
        let Some(action) = action else {
            continue;
        };

        let outcome = step(&mut session, action);
        report(&session, &outcome.event);
    }

    if !session.results.is_empty() {
        println!();
        print_totals(&session);
    }
}

fn select_roller() -> Option<Option<Action>> {
    println!();
    println!("Select roller type:");
    println!("  0. Select Roller");
    for (i, variant) in RollerVariant::ALL.iter().enumerate() {
        println!("  {}. {}", i + 1, variant);
    }
    let input = read_line("Choice (q to quit): ")?;
    if parse_command(&input) == Command::Quit {
        return None;
    }
    Some(Some(Action::SelectRoller(parse_variant_choice(&input))))
}

/// Prompt every constant. `false` when stdin closed.
fn edit_constants(session: &mut Session) -> bool {
    println!();
    println!("Enter new values (blank keeps the current one):");
    for key in ConstantKey::ALL {
        let current = session.constants.get(key);
        let Some(value) = prompt_f64(&format!("  {}", key.display_name()), current) else {
            return false;
        };
        if value != current {
            let outcome = step(session, Action::SetConstant { key, value });
            if let StepEvent::Rejected(e) = outcome.event {
                println!("  {}", e);
            }
        }
    }
    true
}

fn roller_form() -> Option<RollerForm> {
    println!();
    println!("Roller dimensions (mm):");
    let dimensions = RollerDimensions {
        pipe_diameter_mm: prompt_f64("  Pipe diameter", 89.0)?,
        face_width_mm: prompt_f64("  Face width", 190.0)?,
        wall_thickness_mm: prompt_f64("  Pipe thickness", 3.2)?,
        shaft_diameter_mm: prompt_f64("  Shaft diameter", 25.0)?,
        shaft_length_mm: prompt_f64("  Shaft length", 220.0)?,
    };
    let quantity = prompt_u32("Quantity", 1)?;
    let quantity_mode = parse_quantity_mode(&read_line("Quantity counts (r)ollers or (s)ets [rollers]: ")?);
    let weight_method = parse_weight_method(&read_line("Weight method (t)hin shell or (h)ollow cylinder [thin]: ")?);

    Some(RollerForm {
        dimensions,
        quantity,
        quantity_mode,
        weight_method,
    })
}

fn compiled_menu(session: &Session) -> Option<Option<Action>> {
    println!();
    print_roller_table(session.results.rollers());
    println!();
    if session.can_add_frame() {
        println!("(f) cost frame  (a) another roller  (e) export  (r) reset  (q) quit");
    } else {
        println!("(a) another roller  (e) export  (r) reset  (q) quit");
    }
    menu_action(session, |c| match c {
        'f' => Some(Action::CalculateFrame),
        'a' => Some(Action::AddAnotherRoller),
        _ => None,
    })
}

fn frame_compiled_menu(session: &Session) -> Option<Option<Action>> {
    println!();
    print_frame_table(session.results.frames());
    if let (Some(roller), Some(frame)) = (&session.last_roller, session.results.frames().last()) {
        if let Ok(set) = compose_set(roller, frame) {
            println!(
                "Set (3 rollers + frame): {:.2} per set, {} sets, {:.2} total",
                set.set_unit_price, set.set_quantity, set.total_price
            );
        }
    }
    println!();
    println!("(m) more frames  (b) back to rollers  (a) another roller  (e) export  (r) reset  (q) quit");
    menu_action(session, |c| match c {
        'm' => Some(Action::AddMoreFrames),
        'b' => Some(Action::BackToRoller),
        'a' => Some(Action::AddAnotherRoller),
        _ => None,
    })
}

fn menu_action(
    session: &Session,
    map: impl Fn(char) -> Option<Action>,
) -> Option<Option<Action>> {
    let input = read_line("> ")?;
    match parse_command(&input) {
        Command::Quit => None,
        Command::Reset => Some(Some(Action::Reset)),
        Command::Export => {
            export_tables(session);
            Some(None)
        }
        Command::Act(c) => match map(c) {
            Some(action) => Some(Some(action)),
            None => {
                println!("Unknown choice '{}'", input);
                Some(None)
            }
        },
    }
}

fn frame_form(session: &Session) -> Option<FrameRequest> {
    let family = current_frame_family(session);
    let roller_weight_kg = session.last_roller.as_ref().map_or(0.0, |r| r.weight_kg);

    if let Some(family) = family {
        print_reference_table(family);
    }

    let width = read_line("Belt width in mm (blank = from roller weight): ")?;
    let manual_belt_width_mm = width.trim().parse::<u32>().ok();

    let mut edited_bom = None;
    if let Some(family) = family {
        let choice = match manual_belt_width_mm {
            Some(belt_width_mm) => BeltWidthChoice::Manual { belt_width_mm },
            None => BeltWidthChoice::Auto { roller_weight_kg },
        };
        let template = resolve_belt_width(family, choice)
            .and_then(|bw| catalog::template(family, bw.selected_mm));
        if let Ok(mut template) = template {
            println!();
            println!("Fabrication table: {}", family.frame_description(template.belt_width_mm));
            print_bom(&template.lines);
            if prompt_yes_no("Edit quantities or lengths?", false)? {
                for row in 0..template.lines.len() {
                    let line = template.lines[row].clone();
                    println!("  {} ({} {})", line.description, line.section, line.size);
                    let qty = prompt_u32("    Quantity", line.quantity)?;
                    let length = prompt_f64("    Length (m)", line.length_m)?;
                    if let Err(e) = template.set_quantity(row, qty) {
                        println!("    {}", e);
                    }
                    if let Err(e) = template.set_length(row, length) {
                        println!("    {}", e);
                    }
                }
                println!("Edited frame weight: {:.3} kg", template.total_weight_kg());
                edited_bom = Some(template.lines);
            }
        }
    }

    let declared_quantity = prompt_u32("Frame quantity", 1)?;
    Some(FrameRequest {
        manual_belt_width_mm,
        edited_bom,
        declared_quantity,
    })
}

fn export_tables(session: &Session) {
    let dir = export_dir();
    match export::export_session_tables(session, &dir) {
        Ok((rollers, frames)) => {
            println!("Wrote {}", rollers.display());
            println!("Wrote {}", frames.display());
        }
        Err(e) => println!("Export failed: {}", e),
    }

    let workbook = dir.join(export::WORKBOOK_FILE);
    match export::export_workbook(session, &workbook) {
        Ok(()) => println!("Wrote {}", workbook.display()),
        Err(e) => println!("Workbook export failed: {}", e),
    }
}

fn report(session: &Session, event: &StepEvent) {
    match event {
        StepEvent::Moved | StepEvent::ConstantSet { .. } => {}
        StepEvent::RollerRecorded(r) => {
            println!();
            println!("Roller weight: {:.3} kg", r.weight_kg);
            println!(
                "Unit cost {:.2}, unit price {:.2}, {} rollers, total {:.2}",
                r.unit_cost_price, r.unit_price, r.effective_quantity, r.total_price
            );
        }
        StepEvent::FrameRecorded(f) => {
            println!();
            println!("{}: {:.3} kg, unit price {:.2}", f.description, f.frame_weight_kg, f.unit_price);
        }
        StepEvent::Warning(message) => println!("{}", message),
        StepEvent::Rejected(e) => {
            println!("Error: {}", e);
            if session.stage == Stage::Compiled && e.is_frame_rejection() {
                println!("Returning to the roller costing.");
            }
        }
    }
}

// ============================================================================
// Tables
// ============================================================================

fn print_roller_table(rows: &[RollerCostingRecord]) {
    println!("{}", RULE);
    println!("  ROLLER COSTING");
    println!("{}", RULE);
    println!(
        "{:<30} {:>6} {:>9} {:>5} {:>5} {:>11} {:>11} {:>12}",
        "Roller", "BW", "Wt (kg)", "Qty", "Sets", "Unit cost", "Unit price", "Total"
    );
    for r in rows {
        let bw = r.belt_width_mm.map(|w| w.to_string()).unwrap_or_default();
        println!(
            "{:<30} {:>6} {:>9.3} {:>5} {:>5} {:>11.2} {:>11.2} {:>12.2}",
            r.variant.display_name(),
            bw,
            r.weight_kg,
            r.effective_quantity,
            r.set_quantity,
            r.unit_cost_price,
            r.unit_price,
            r.total_price
        );
    }
}

fn print_frame_table(rows: &[FrameCostingRecord]) {
    println!("{}", RULE);
    println!("  FRAME COSTING");
    println!("{}", RULE);
    println!(
        "{:<26} {:>9} {:>11} {:>5} {:>11} {:>12}",
        "Frame", "Wt (kg)", "Unit cost", "Sets", "Unit price", "Total"
    );
    for f in rows {
        println!(
            "{:<26} {:>9.3} {:>11.2} {:>5} {:>11.2} {:>12.2}",
            f.description, f.frame_weight_kg, f.unit_cost_price, f.set_quantity, f.unit_price, f.total_price
        );
    }
}

fn print_reference_table(family: FrameFamily) {
    println!();
    println!("{} reference frame weights:", family);
    for (width, kg) in catalog::reference_weights(family) {
        println!("  {:>5} mm  {:>7.2} kg", width, kg);
    }
}

fn print_bom(lines: &[FrameBoMLine]) {
    println!(
        "  {:<3} {:<22} {:<8} {:<16} {:>7} {:>7} {:>4} {:>8}",
        "#", "Description", "Section", "Size", "kg/m", "Len m", "Qty", "Wt kg"
    );
    for (i, l) in lines.iter().enumerate() {
        println!(
            "  {:<3} {:<22} {:<8} {:<16} {:>7.2} {:>7.3} {:>4} {:>8.3}",
            i, l.description, l.section, l.size, l.weight_per_m_kg, l.length_m, l.quantity, l.total_weight_kg
        );
    }
}

fn print_totals(session: &Session) {
    println!("{}", RULE);
    println!("  Rollers: {:>12.2}", session.results.roller_total());
    println!("  Frames:  {:>12.2}", session.results.frame_total());
    println!("  Total:   {:>12.2}", session.results.grand_total());
    println!("{}", RULE);
}

// ============================================================================
// Bulk estimator
// ============================================================================

fn run_bulk(path: &Path) {
    let items = match read_item_names(path) {
        Ok(items) => items,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!("{}", json);
            }
            std::process::exit(1);
        }
    };

    println!("Found {} items: {}", items.len(), items.join(", "));
    let mut sheet = PriceSheet::new(items);

    while let Some(item) = sheet.current_item().map(str::to_string) {
        let Some(input) = read_line(&format!("Price of '{}': ", item)) else {
            break;
        };
        match sheet.submit(&input) {
            SubmitOutcome::Rejected(_) => println!("Please enter a numeric price."),
            SubmitOutcome::Complete(summary) => print_price_summary(&summary),
            SubmitOutcome::Accepted { .. } | SubmitOutcome::AlreadyComplete => {}
        }
    }

    if sheet.items().is_empty() {
        print_price_summary(&sheet.summary());
    }
}

fn print_price_summary(summary: &PriceSummary) {
    println!();
    println!("All item prices entered:");
    for line in &summary.lines {
        println!("  - {}: {:.2}", line.item, line.price);
    }
    println!("Total project cost: {:.2}", summary.total);
}
