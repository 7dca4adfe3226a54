//! Workflow runner
//!
//! Drives the returns workflow against a live backend, one request at a
//! time in a fixed order. Required steps stop the run on the first failure;
//! optional steps are reported and the run carries on.

use rust_decimal::Decimal;
use serde_json::json;

use crate::api::types::{
    NewOrder, NewOrderItem, NewReturn, Order, OrderStatus, RefundMethod, ReturnRecord,
    ReturnStatus,
};
use crate::api::ApiClient;
use crate::common::config::Accounts;
use crate::common::{Error, Result};
use crate::session::{AccessToken, Role, Session};

use super::report::{self, Flow, FlowOutcome, FlowRecord};
use super::scenario::Scenario;
use super::state::WorkflowState;

/// Switches that widen or narrow a run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Run the rejection flow even if the scenario leaves it off
    pub with_rejection: bool,
    pub skip_warranties: bool,
    pub skip_audit: bool,
    /// Entries printed from transaction and audit listings
    pub list_preview: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            with_rejection: false,
            skip_warranties: false,
            skip_audit: false,
            list_preview: 3,
        }
    }
}

/// Result of a workflow run
#[derive(Debug)]
pub struct RunReport {
    pub name: String,
    pub passed: bool,
    /// The required flow that stopped the run
    pub failed_flow: Option<Flow>,
    pub error: Option<String>,
    pub state: WorkflowState,
    pub flows: Vec<FlowRecord>,
    /// Client wallet balance before the approval: 0 when no wallet existed,
    /// None when it could not be read
    pub balance_before: Option<Decimal>,
    /// Client wallet balance after the approval
    pub balance_after: Option<Decimal>,
}

impl RunReport {
    pub fn outcome(&self, flow: Flow) -> Option<&FlowOutcome> {
        self.flows
            .iter()
            .find(|record| record.flow == flow)
            .map(|record| &record.outcome)
    }
}

/// Run the full returns workflow
pub async fn run_workflow(
    api: &ApiClient,
    accounts: &Accounts,
    scenario: &Scenario,
    options: &RunOptions,
) -> Result<RunReport> {
    scenario.validate()?;

    report::header("RETURNS AND WARRANTIES SMOKE TEST");
    println!("Server: {}", api.base_url());
    println!("Date: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!("Scenario: {}", scenario.name);
    if let Some(desc) = &scenario.description {
        println!("  {}", desc);
    }

    let runner = Runner {
        api,
        accounts,
        scenario,
        options,
        session: Session::new(),
        state: WorkflowState::default(),
        flows: Flow::ALL
            .iter()
            .map(|&flow| FlowRecord {
                flow,
                outcome: FlowOutcome::Skipped("not reached".to_string()),
            })
            .collect(),
        balance_before: None,
        balance_after: None,
    };

    Ok(runner.execute().await)
}

struct Runner<'a> {
    api: &'a ApiClient,
    accounts: &'a Accounts,
    scenario: &'a Scenario,
    options: &'a RunOptions,
    session: Session,
    state: WorkflowState,
    flows: Vec<FlowRecord>,
    balance_before: Option<Decimal>,
    balance_after: Option<Decimal>,
}

impl<'a> Runner<'a> {
    async fn execute(mut self) -> RunReport {
        // Required prefix: any failure aborts the remaining sequence
        if let Err(e) = self.authenticate().await {
            return self.abort(Flow::Authentication, e);
        }
        self.mark(Flow::Authentication, FlowOutcome::Passed);

        if let Err(e) = self.fetch_product().await {
            return self.abort(Flow::ProductLookup, e);
        }
        self.mark(Flow::ProductLookup, FlowOutcome::Passed);

        if let Err(e) = self.select_order().await {
            return self.abort(Flow::OrderSelection, e);
        }
        self.mark(Flow::OrderSelection, FlowOutcome::Passed);

        self.record_balance_baseline().await;

        if let Err(e) = self.request_return().await {
            return self.abort(Flow::ReturnRequest, e);
        }
        self.mark(Flow::ReturnRequest, FlowOutcome::Passed);

        let outcome = self.return_details().await;
        self.mark(Flow::ReturnDetails, outcome);

        if let Err(e) = self.send_to_evaluation().await {
            return self.abort(Flow::Evaluation, e);
        }
        self.mark(Flow::Evaluation, FlowOutcome::Passed);

        if let Err(e) = self.approve().await {
            return self.abort(Flow::Approval, e);
        }
        self.mark(Flow::Approval, FlowOutcome::Passed);

        match self.verify_wallet().await {
            Ok(outcome) => self.mark(Flow::Wallet, outcome),
            Err(e) => return self.abort(Flow::Wallet, e),
        }

        // Optional tail: failures are reported, the run continues
        let outcome = self.my_returns().await;
        self.mark(Flow::MyReturns, outcome);

        let outcome = self.all_returns().await;
        self.mark(Flow::AllReturns, outcome);

        let outcome = self.rejection_flow().await;
        self.mark(Flow::Rejection, outcome);

        let outcome = self.warranties().await;
        self.mark(Flow::Warranties, outcome);

        let outcome = self.audit_log().await;
        self.mark(Flow::AuditLog, outcome);

        report::print_summary(&self.state, &self.session, &self.flows);

        let warned = self
            .flows
            .iter()
            .any(|r| matches!(r.outcome, FlowOutcome::Warned(_)));
        if warned {
            report::header("[OK] REQUIRED CHECKS PASSED (WITH WARNINGS)");
        } else {
            report::header("[OK] ALL CHECKS COMPLETED SUCCESSFULLY");
        }

        self.finish(None, None)
    }

    fn mark(&mut self, flow: Flow, outcome: FlowOutcome) {
        if let Some(record) = self.flows.iter_mut().find(|r| r.flow == flow) {
            record.outcome = outcome;
        }
    }

    fn abort(mut self, flow: Flow, error: Error) -> RunReport {
        tracing::error!(flow = flow.name(), error = %error, "required step failed");
        report::error(&format!("{} failed: {}", flow.name(), error));

        self.mark(flow, FlowOutcome::Failed(short_reason(&error)));
        for record in &mut self.flows {
            if record.outcome == FlowOutcome::Skipped("not reached".to_string()) {
                record.outcome = FlowOutcome::Skipped("run aborted".to_string());
            }
        }

        report::print_summary(&self.state, &self.session, &self.flows);
        report::header("[ERROR] RUN ABORTED");

        self.finish(Some(flow), Some(error.to_string()))
    }

    fn finish(self, failed_flow: Option<Flow>, error: Option<String>) -> RunReport {
        RunReport {
            name: self.scenario.name.clone(),
            passed: failed_flow.is_none(),
            failed_flow,
            error,
            state: self.state,
            flows: self.flows,
            balance_before: self.balance_before,
            balance_after: self.balance_after,
        }
    }

    fn token(&self, role: Role) -> Result<AccessToken> {
        self.session.token(role).cloned()
    }

    // === Required steps ===

    async fn authenticate(&mut self) -> Result<()> {
        report::header("STEP 1: USER AUTHENTICATION");

        for role in Role::ALL {
            let credentials = self.accounts.get(role);
            report::info(&format!(
                "Logging in as {}: {}",
                role, credentials.username
            ));

            let user = match self.session.login(self.api, role, credentials).await {
                Ok(user) => user,
                Err(e) => {
                    report::error(&format!("Login failed - {}", role));
                    return Err(e);
                }
            };

            if user.user_id.is_some() {
                report::success(&format!("Login successful - {}", role));
            } else {
                report::success(&format!("Login successful - {} (no profile)", role));
            }
            report::data(
                &format!("User {}", role),
                &json!({
                    "id": user.user_id,
                    "username": user.username,
                    "role": user.backend_role,
                }),
            );
        }
        Ok(())
    }

    async fn fetch_product(&mut self) -> Result<()> {
        report::header("STEP 2: FETCH EXISTING PRODUCT");
        report::info("Fetching an existing product...");

        let token = self.token(Role::Admin)?;
        let products = self.api.list_products(&token).await?;
        let product = products.into_iter().next().ok_or(Error::NoProducts)?;

        self.state.product_id = Some(product.id);
        report::success(&format!("Product found - ID: {}", product.id));
        report::data("Product", &product);
        Ok(())
    }

    async fn select_order(&mut self) -> Result<()> {
        report::header("STEP 3: SELECT CLIENT ORDER");
        let client = self.token(Role::Client)?;

        let orders = if self.scenario.order.fresh {
            report::info("Fresh order requested, skipping existing orders");
            Vec::new()
        } else {
            self.api.list_orders(&client).await?
        };

        match pick_order(&orders) {
            Some(order) if order.status == OrderStatus::Delivered => {
                self.adopt_order(order);
                report::success(&format!("DELIVERED order found - ID: {}", order.id));
                report::data("Order", &order_summary(order));
            }
            Some(order) => {
                self.adopt_order(order);
                report::info(&format!(
                    "No DELIVERED order, using PAID order - ID: {}",
                    order.id
                ));
                report::data("PAID order", &order_summary(order));

                report::header("STEP 4: MARK ORDER AS DELIVERED (ADMIN)");
                self.mark_delivered_via_admin(order.id).await?;
            }
            None => {
                if !self.scenario.order.fresh {
                    report::info("Client has no PAID or DELIVERED orders, creating one");
                }

                report::header("STEP 4: CREATE AND DELIVER ORDER (CLIENT, ADMIN)");
                let scenario = self.scenario;
                let order_id = self
                    .create_delivered_order(&scenario.order.shipping_address)
                    .await
                    .map_err(|e| {
                        tracing::error!(error = %e, "could not provide an order to return");
                        Error::NoEligibleOrder(Box::new(e))
                    })?;
                self.state.order_id = Some(order_id);
            }
        }
        Ok(())
    }

    fn adopt_order(&mut self, order: &Order) {
        self.state.order_id = Some(order.id);
        if let Some(product_id) = order.first_product_id() {
            self.state.product_id = Some(product_id);
        }
    }

    /// Best effort: a PAID order stays usable when the patch is refused
    async fn mark_delivered_via_admin(&self, order_id: i64) -> Result<()> {
        report::info(&format!(
            "Trying to mark order {} as DELIVERED through the admin route...",
            order_id
        ));
        let admin = self.token(Role::Admin)?;

        match self
            .api
            .admin_update_order_status(&admin, order_id, OrderStatus::Delivered)
            .await
        {
            Ok(order) => {
                report::success("Order marked as DELIVERED");
                report::data("Updated order", &order_summary(&order));
            }
            Err(e) => {
                tracing::warn!(order_id, error = %e, "admin status update refused");
                report::info(&format!(
                    "Could not mark as DELIVERED ({}), continuing with the PAID order",
                    short_reason(&e)
                ));
            }
        }
        Ok(())
    }

    /// Create a one-item order as the client and deliver it as the admin
    async fn create_delivered_order(&self, shipping_address: &str) -> Result<i64> {
        let client = self.token(Role::Client)?;
        let admin = self.token(Role::Admin)?;
        let product_id = self.state.product_id()?;

        report::info("Creating test order as client...");
        let order = self
            .api
            .create_order(
                &client,
                &NewOrder {
                    items: vec![NewOrderItem {
                        product: product_id,
                        quantity: self.scenario.order.quantity,
                    }],
                    shipping_address: shipping_address.to_string(),
                    payment_method: self.scenario.order.payment_method.clone(),
                },
            )
            .await?;
        report::success(&format!("Order created - ID: {}", order.id));
        report::data("Order", &order_summary(&order));

        report::info(&format!("Marking order {} as DELIVERED...", order.id));
        let delivered = self
            .api
            .update_order_status(&admin, order.id, OrderStatus::Delivered)
            .await?;
        if delivered.status != OrderStatus::Delivered {
            return Err(Error::Assertion(format!(
                "Order {} is {} after the status update, expected DELIVERED",
                delivered.id, delivered.status
            )));
        }
        report::success("Order marked as DELIVERED");
        report::data("Updated order", &order_summary(&delivered));

        Ok(order.id)
    }

    /// Balance before the refund; a missing wallet (404) counts as 0
    ///
    /// Any other failure leaves the baseline unknown, so the credit check
    /// cannot pass on a balance the client already had.
    async fn record_balance_baseline(&mut self) {
        let client = match self.token(Role::Client) {
            Ok(client) => client,
            Err(_) => return,
        };

        match self.api.my_balance(&client).await {
            Ok(balance) => {
                report::info(&format!("Wallet balance before refund: {}", balance.balance));
                self.balance_before = Some(balance.balance);
            }
            Err(e) if e.http_status() == Some(404) => {
                report::info("No wallet yet, using 0 as baseline");
                self.balance_before = Some(Decimal::ZERO);
            }
            Err(e) => {
                tracing::warn!(error = %e, "wallet baseline not readable");
                report::warn(&format!(
                    "Wallet balance unavailable before refund ({}), credit check will be skipped",
                    short_reason(&e)
                ));
                self.balance_before = None;
            }
        }
    }

    async fn request_return(&mut self) -> Result<()> {
        report::header("STEP 5: RETURN REQUEST (CLIENT)");
        let fixture = &self.scenario.return_request;
        let request = NewReturn {
            order_id: self.state.order_id()?,
            product_id: self.state.product_id()?,
            quantity: fixture.quantity,
            reason: fixture.reason.clone(),
            description: fixture.description.clone(),
            refund_method: fixture.refund_method.clone(),
        };

        let record = self.submit_return(&request).await?;
        self.state.return_id = Some(record.id);
        Ok(())
    }

    /// File a return as the client; it must come back REQUESTED
    async fn submit_return(&self, request: &NewReturn) -> Result<ReturnRecord> {
        report::info(&format!(
            "Client requests a return (order_id={}, product_id={})",
            request.order_id, request.product_id
        ));
        let client = self.token(Role::Client)?;
        let record = self.api.create_return(&client, request).await?;

        report::success(&format!("Return requested - ID: {}", record.id));
        report::data(
            "Return",
            &json!({
                "id": record.id,
                "status": record.status,
                "reason": record.reason,
                "refund_method": record.refund_method,
            }),
        );

        if record.status != ReturnStatus::Requested {
            return Err(Error::Assertion(format!(
                "New return {} is {}, expected REQUESTED",
                record.id, record.status
            )));
        }
        Ok(record)
    }

    async fn send_to_evaluation(&self) -> Result<()> {
        report::header("STEP 7: SEND TO EVALUATION (MANAGER)");
        let return_id = self.state.return_id()?;
        self.evaluate(return_id).await
    }

    async fn evaluate(&self, return_id: i64) -> Result<()> {
        report::info(&format!(
            "Manager sends return {} to evaluation...",
            return_id
        ));
        let manager = self.token(Role::Manager)?;
        let result = self.api.send_to_evaluation(&manager, return_id).await?;

        report::success("Return sent to evaluation");
        report::data(
            "Updated status",
            &json!({
                "id": result.id.unwrap_or(return_id),
                "status": result.status,
                "message": result.message.as_deref().unwrap_or("Evaluation started"),
            }),
        );
        Ok(())
    }

    async fn approve(&self) -> Result<()> {
        report::header("STEP 8: APPROVE RETURN AND PROCESS REFUND (MANAGER)");
        let return_id = self.state.return_id()?;
        let manager = self.token(Role::Manager)?;
        let client = self.token(Role::Client)?;

        report::info(&format!("Manager approves return {}...", return_id));
        let result = self
            .api
            .approve_return(&manager, return_id, &self.scenario.approval.evaluation_notes)
            .await?;
        report::success("Return approved and refund processed");
        report::data("Result", &result);

        let record = self.api.get_return(&client, return_id).await?;
        if !record.status.is_refunded() {
            return Err(Error::Assertion(format!(
                "Return {} is {} after approval, expected APPROVED or COMPLETED",
                return_id, record.status
            )));
        }
        report::success(&format!("Return {} is now {}", return_id, record.status));
        Ok(())
    }

    /// Wallet checks after the refund
    ///
    /// Only a balance that did not grow after a wallet refund is fatal;
    /// missing wallet endpoints are warnings.
    async fn verify_wallet(&mut self) -> Result<FlowOutcome> {
        report::header("STEP 9: VERIFY CLIENT WALLET");
        let client = self.token(Role::Client)?;

        report::info("Fetching client wallet...");
        let wallet = match self.api.my_wallet(&client).await {
            Ok(wallet) => wallet,
            Err(e) => {
                report::warn(&format!("Could not fetch wallet: {}", e));
                return Ok(FlowOutcome::Warned(format!(
                    "wallet unavailable: {}",
                    short_reason(&e)
                )));
            }
        };
        self.state.wallet_id = Some(wallet.id);
        report::success(&format!("Wallet found - ID: {}", wallet.id));
        report::data("Wallet", &wallet);

        let mut problems = Vec::new();

        report::info("Fetching wallet balance...");
        match self.api.my_balance(&client).await {
            Ok(balance) => {
                report::success("Balance fetched");
                report::data("Balance", &balance);
                self.balance_after = Some(balance.balance);
                if !self.check_refund_credited(balance.balance)? {
                    problems.push("baseline unavailable".to_string());
                }
            }
            Err(e) => {
                report::warn(&format!("Balance unavailable: {}", e));
                problems.push(format!("balance: {}", short_reason(&e)));
            }
        }

        report::info("Fetching wallet transactions...");
        match self.api.my_transactions(&client).await {
            Ok(transactions) => {
                report::success(&format!(
                    "Transactions fetched - Total: {}",
                    transactions.len()
                ));
                let shown = transactions.len().min(self.options.list_preview);
                report::data("Transactions", &transactions[..shown]);
            }
            Err(e) => {
                report::warn(&format!("Transactions endpoint unavailable: {}", e));
                problems.push(format!("transactions: {}", short_reason(&e)));
            }
        }

        report::info("Fetching wallet statistics...");
        match self.api.wallet_statistics(&client).await {
            Ok(stats) => {
                report::success("Statistics fetched");
                report::data("Statistics", &stats);
            }
            Err(e) => {
                report::warn(&format!("Statistics endpoint unavailable: {}", e));
                problems.push(format!("statistics: {}", short_reason(&e)));
            }
        }

        if problems.is_empty() {
            Ok(FlowOutcome::Passed)
        } else {
            Ok(FlowOutcome::Warned(problems.join(", ")))
        }
    }

    /// Whether a wallet refund raised the balance
    ///
    /// `Ok(false)` when the check could not run for lack of a baseline.
    fn check_refund_credited(&self, balance: Decimal) -> Result<bool> {
        if self.scenario.return_request.refund_method != RefundMethod::Wallet {
            return Ok(true);
        }
        let Some(before) = self.balance_before else {
            report::warn("No baseline balance, cannot verify the refund credit");
            return Ok(false);
        };
        if balance <= before {
            return Err(Error::Assertion(format!(
                "Wallet balance did not increase after the refund (before {}, after {})",
                before, balance
            )));
        }
        report::success(&format!(
            "Wallet credited: {} -> {} (+{})",
            before,
            balance,
            balance - before
        ));
        Ok(true)
    }

    // === Optional steps ===

    async fn return_details(&self) -> FlowOutcome {
        report::header("STEP 6: RETURN DETAILS");
        let result = async {
            let return_id = self.state.return_id()?;
            report::info(&format!("Fetching details of return {}...", return_id));
            let client = self.token(Role::Client)?;
            let record = self.api.get_return(&client, return_id).await?;
            Ok::<_, Error>(record)
        }
        .await;

        match result {
            Ok(record) => {
                report::success("Details fetched");
                report::data("Return", &record);
                FlowOutcome::Passed
            }
            Err(e) => optional_failure("Could not fetch return details", &e),
        }
    }

    async fn my_returns(&self) -> FlowOutcome {
        report::header("STEP 10: CLIENT LISTS OWN RETURNS");
        report::info("Client fetches own returns...");
        let result = async {
            let client = self.token(Role::Client)?;
            let returns = self.api.my_returns(&client).await?;
            Ok::<_, Error>(returns)
        }
        .await;

        match result {
            Ok(returns) => {
                report::success(&format!("Returns fetched - Total: {}", returns.len()));
                report::data("My returns", &returns);
                self.expect_listed(&returns)
            }
            Err(e) => optional_failure("Could not fetch client returns", &e),
        }
    }

    async fn all_returns(&self) -> FlowOutcome {
        report::header("STEP 11: MANAGER LISTS ALL RETURNS");
        report::info("Manager fetches all returns...");
        let result = async {
            let manager = self.token(Role::Manager)?;
            let returns = self.api.all_returns(&manager).await?;
            Ok::<_, Error>(returns)
        }
        .await;

        match result {
            Ok(returns) => {
                report::success(&format!("All returns - Total: {}", returns.len()));
                report::data("System returns", &returns);
                self.expect_listed(&returns)
            }
            Err(e) => optional_failure("Could not fetch all returns", &e),
        }
    }

    fn expect_listed(&self, returns: &[ReturnRecord]) -> FlowOutcome {
        match self.state.return_id {
            Some(id) if returns.iter().any(|r| r.id == id) => FlowOutcome::Passed,
            Some(id) => {
                report::warn(&format!("Return {} is missing from the listing", id));
                FlowOutcome::Warned(format!("return {} not listed", id))
            }
            None => FlowOutcome::Passed,
        }
    }

    async fn rejection_flow(&self) -> FlowOutcome {
        report::header("RETURN REJECTION FLOW");

        if !(self.options.with_rejection || self.scenario.rejection.enabled) {
            report::info("Optional flow disabled - it creates an extra order on the backend");
            report::info("Enable with --with-rejection or rejection.enabled in the scenario");
            return FlowOutcome::Skipped("disabled".to_string());
        }

        match self.reject_second_return().await {
            Ok(()) => FlowOutcome::Passed,
            Err(e) => optional_failure("Rejection flow failed", &e),
        }
    }

    async fn reject_second_return(&self) -> Result<()> {
        let scenario = self.scenario;
        let fixture = &scenario.rejection;
        let manager = self.token(Role::Manager)?;
        let client = self.token(Role::Client)?;

        report::info("Creating a second order to exercise rejection...");
        let order_id = self.create_delivered_order(&fixture.shipping_address).await?;

        let record = self
            .submit_return(&NewReturn {
                order_id,
                product_id: self.state.product_id()?,
                quantity: 1,
                reason: fixture.reason.clone(),
                description: fixture.description.clone(),
                refund_method: fixture.refund_method.clone(),
            })
            .await?;
        self.evaluate(record.id).await?;

        let before = self.read_balance().await;

        report::info(&format!("Manager rejects return {}...", record.id));
        let result = self
            .api
            .reject_return(&manager, record.id, &fixture.rejection_reason)
            .await?;
        report::success("Return rejected");
        report::data("Rejection result", &result);

        let rejected = self.api.get_return(&client, record.id).await?;
        if rejected.status != ReturnStatus::Rejected {
            return Err(Error::Assertion(format!(
                "Return {} is {} after rejection, expected REJECTED",
                record.id, rejected.status
            )));
        }

        let after = self.read_balance().await;
        if let (Some(before), Some(after)) = (before, after) {
            if before != after {
                return Err(Error::Assertion(format!(
                    "Wallet balance changed after a rejection ({} -> {})",
                    before, after
                )));
            }
            report::success(&format!("Wallet balance unchanged at {}", after));
        }
        Ok(())
    }

    async fn warranties(&self) -> FlowOutcome {
        report::header("WARRANTY SYSTEM");
        if self.options.skip_warranties {
            return FlowOutcome::Skipped("--skip-warranties".to_string());
        }

        report::info("Fetching available warranties...");
        let result = async {
            let client = self.token(Role::Client)?;
            let warranties = self.api.list_warranties(&client).await?;
            report::success(&format!(
                "Warranties fetched - Total: {}",
                warranties.len()
            ));
            report::data("Warranties", &warranties);

            let order_id = self.state.order_id()?;
            match warranties.iter().find(|w| w.covers_order(order_id)) {
                Some(warranty) => {
                    report::success(&format!("Warranty found for order {}", order_id));
                    let detail = self.api.get_warranty(&client, warranty.id).await?;
                    report::success("Full warranty details fetched");
                    report::data("Warranty", &detail);
                }
                None => report::info("No warranty found for the test order"),
            }
            Ok::<_, Error>(())
        }
        .await;

        match result {
            Ok(()) => FlowOutcome::Passed,
            Err(e) => optional_failure("Could not fetch warranties", &e),
        }
    }

    async fn audit_log(&self) -> FlowOutcome {
        report::header("AUDIT LOG");
        if self.options.skip_audit {
            return FlowOutcome::Skipped("--skip-audit".to_string());
        }

        report::info("Fetching system audit log...");
        let result = async {
            let admin = self.token(Role::Admin)?;
            let entries = self
                .api
                .audit_log(&admin, self.scenario.audit.page_size)
                .await?;
            Ok::<_, Error>(entries)
        }
        .await;

        match result {
            Ok(entries) => {
                report::success(&format!("Audit entries fetched - Total: {}", entries.len()));
                let shown = entries.len().min(self.options.list_preview);
                report::data("Latest audited actions", &entries[..shown]);
                FlowOutcome::Passed
            }
            Err(e) => {
                report::warn(&format!("Audit log unavailable ({})", short_reason(&e)));
                report::info("This is optional - the returns workflow itself passed");
                FlowOutcome::Warned(format!("unavailable: {}", short_reason(&e)))
            }
        }
    }

    /// Current client balance, None if the wallet cannot be read
    async fn read_balance(&self) -> Option<Decimal> {
        let client = self.token(Role::Client).ok()?;
        match self.api.my_balance(&client).await {
            Ok(balance) => Some(balance.balance),
            Err(e) => {
                tracing::debug!(error = %e, "wallet balance not readable");
                None
            }
        }
    }
}

/// The order a return is filed against: first DELIVERED, else first PAID
pub fn pick_order(orders: &[Order]) -> Option<&Order> {
    orders
        .iter()
        .find(|o| o.status == OrderStatus::Delivered)
        .or_else(|| orders.iter().find(|o| o.status == OrderStatus::Paid))
}

fn order_summary(order: &Order) -> serde_json::Value {
    json!({
        "id": order.id,
        "status": order.status,
        "total_price": order
            .total_price
            .map(|p| p.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
    })
}

fn optional_failure(context: &str, error: &Error) -> FlowOutcome {
    tracing::warn!(error = %error, "{}", context);
    report::warn(&format!("{}: {}", context, error));
    FlowOutcome::Warned(short_reason(error))
}

/// One-line reason for the summary table
fn short_reason(error: &Error) -> String {
    match error.http_status() {
        Some(status) => format!("HTTP {}", status),
        None => error.to_string(),
    }
}
