//! Console report for a workflow run
//!
//! Everything a person watching the run reads goes through here, on stdout.
//! Diagnostics for the tool itself go through `tracing` on stderr instead.

use colored::Colorize;
use serde::Serialize;

use super::state::WorkflowState;
use crate::session::Session;

const RULE_WIDTH: usize = 80;

/// Turn colour off (e.g. `--no-color` or output piped to a file)
pub fn disable_color() {
    colored::control::set_override(false);
}

pub fn header(text: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{}", rule.blue().bold());
    println!("{}", text.cyan().bold());
    println!("{}\n", rule.blue().bold());
}

pub fn success(text: &str) {
    println!("{}", format!("[OK] {}", text).green());
}

pub fn error(text: &str) {
    println!("{}", format!("[ERROR] {}", text).red());
}

pub fn info(text: &str) {
    println!("{}", format!("[INFO] {}", text).yellow());
}

/// An optional step that could not complete; the run goes on
pub fn warn(text: &str) {
    println!("{}", format!("[WARN] {}", text).yellow().bold());
}

/// Print a labelled value as indented JSON
pub fn data<T: Serialize + ?Sized>(label: &str, value: &T) {
    println!("{}", format!("{}:", label).cyan());
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("  <unprintable: {}>", e),
    }
}

/// How one flow of the run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Passed,
    /// Not attempted (disabled, or the run stopped before it)
    Skipped(String),
    /// Optional flow that failed without stopping the run
    Warned(String),
    /// Required flow that stopped the run
    Failed(String),
}

/// The flows a run exercises, in run order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Authentication,
    ProductLookup,
    OrderSelection,
    ReturnRequest,
    ReturnDetails,
    Evaluation,
    Approval,
    Wallet,
    MyReturns,
    AllReturns,
    Rejection,
    Warranties,
    AuditLog,
}

impl Flow {
    pub const ALL: [Flow; 13] = [
        Flow::Authentication,
        Flow::ProductLookup,
        Flow::OrderSelection,
        Flow::ReturnRequest,
        Flow::ReturnDetails,
        Flow::Evaluation,
        Flow::Approval,
        Flow::Wallet,
        Flow::MyReturns,
        Flow::AllReturns,
        Flow::Rejection,
        Flow::Warranties,
        Flow::AuditLog,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Flow::Authentication => "Login and authentication",
            Flow::ProductLookup => "Product lookup",
            Flow::OrderSelection => "Order selection",
            Flow::ReturnRequest => "Return request",
            Flow::ReturnDetails => "Return details",
            Flow::Evaluation => "Return evaluation",
            Flow::Approval => "Approval with refund",
            Flow::Wallet => "Wallet and transactions",
            Flow::MyReturns => "Client returns listing",
            Flow::AllReturns => "Manager returns listing",
            Flow::Rejection => "Return rejection",
            Flow::Warranties => "Warranty system",
            Flow::AuditLog => "Audit log",
        }
    }
}

/// A flow with its outcome, listed in the summary
#[derive(Debug, Clone)]
pub struct FlowRecord {
    pub flow: Flow,
    pub outcome: FlowOutcome,
}

pub fn print_summary(state: &WorkflowState, session: &Session, flows: &[FlowRecord]) {
    header("TEST SUMMARY");

    println!("{}", "Generated IDs:".bold());
    println!("  • Product ID: {}", display_id(state.product_id));
    println!("  • Order ID: {}", display_id(state.order_id));
    println!("  • Return ID: {}", display_id(state.return_id));
    println!("  • Wallet ID: {}", display_id(state.wallet_id));

    println!("\n{}", "Authenticated users:".bold());
    for (role, user) in session.users() {
        println!(
            "  • {}: {} (ID {})",
            role,
            user.username,
            display_id(user.user_id)
        );
    }

    println!("\n{}", "Flows:".bold());
    for flow in flows {
        let name = flow.flow.name();
        match &flow.outcome {
            FlowOutcome::Passed => println!("  {} {}", "[OK]".green(), name),
            FlowOutcome::Skipped(why) => {
                println!("  {} {} ({})", "[SKIP]".dimmed(), name, why.dimmed())
            }
            FlowOutcome::Warned(why) => println!("  {} {} ({})", "[WARN]".yellow(), name, why),
            FlowOutcome::Failed(why) => println!("  {} {} ({})", "[FAIL]".red(), name, why),
        }
    }
}

fn display_id(id: Option<i64>) -> String {
    id.map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string())
}
