#![allow(dead_code)]

//! Shared fixtures: a ledger account data object and the contexts that cast
//! roles over it.

use rolecast::prelude::*;

#[derive(Default)]
pub struct Account {
    balance: f64,
    owner: String,
    ledger_code: u32,
    bindings: Bindings,
}

impl Account {
    pub fn new(balance: f64, owner: &str) -> Account {
        Account {
            balance,
            owner: owner.to_owned(),
            ..Account::default()
        }
    }

    fn balance(&self) -> f64 {
        self.balance
    }

    fn increase_balance(&mut self, amount: f64) {
        self.balance += amount;
    }

    fn decrease_balance(&mut self, amount: f64) {
        self.balance -= amount;
    }

    fn ledger_code(&self) -> u32 {
        self.ledger_code
    }

    fn audit_tag(&self) -> &'static str {
        "ledger-internal"
    }
}

data_object! {
    impl Account {
        bindings: bindings;
        methods {
            pub fn balance(&self) -> f64;
            pub fn increase_balance(&mut self, amount: f64);
            pub fn decrease_balance(&mut self, amount: f64);
            pub fn ledger_code(&self) -> u32;
            fn audit_tag(&self) -> &'static str;
        }
        properties {
            pub owner: String;
            ledger_code: u32;
        }
    }
}

pub fn account(balance: f64, owner: &str) -> Obj {
    Obj::new(Account::new(balance, owner))
}

role! {
    pub static SOURCE_ACCOUNT: "SourceAccount" {
        fn withdraw(scope, amount: f64) {
            scope.call_data("decrease_balance", args![amount])?;
        }

        fn identity(scope) {
            scope.object()
        }

        fn drain(scope) {
            let balance: f64 = scope.call_as("balance", args![])?;
            scope.call("withdraw", args![balance])?;
        }

        fn probe_limit(scope) {
            scope.get_as::<f64>("credit_limit")?
        }
    }

    pub static DESTINATION_ACCOUNT: "DestinationAccount" {
        fn deposit(scope, amount: f64) {
            scope.call_data("increase_balance", args![amount])?;
        }

        fn stamp(scope, code: u32) {
            scope.set("ledger_code", Value::new(code))?;
        }

        fn read_code(scope) {
            scope.get_as::<u32>("ledger_code")?
        }
    }

    /// Collides with `Account::balance` at bind time.
    pub static SHADOWING: "Shadowing" {
        fn balance(scope) {
            scope.get_as::<String>("owner")?
        }
    }

    /// Collides with `Account::audit_tag`, which is not even dispatchable.
    pub static PRIVATE_SHADOW: "PrivateShadow" {
        fn audit_tag(scope) {
            scope.get_as::<String>("owner")?
        }
    }

    /// Collides with the `withdraw` installed by `SourceAccount`.
    pub static DOUBLE_SOURCE: "DoubleSource" {
        fn withdraw(scope, amount: f64) {
            scope.call_data("decrease_balance", args![amount])?;
        }
    }
}

pub struct TransferMoney {
    source: Obj,
    destination: Obj,
    state: ContextState,
    bindings: Bindings,
}

impl TransferMoney {
    pub fn new(source: &Obj, destination: &Obj) -> TransferMoney {
        TransferMoney {
            source: source.clone(),
            destination: destination.clone(),
            state: ContextState::new(),
            bindings: Bindings::new(),
        }
    }

    fn transfer(ctx: &Ctx, amount: f64) -> Result<(), Error> {
        let source: Obj = ctx.get_as("source")?;
        let destination: Obj = ctx.get_as("destination")?;
        source.add_role("SourceAccount", ctx)?;
        destination.add_role("DestinationAccount", ctx)?;
        source.call("withdraw", args![amount])?;
        destination.call("deposit", args![amount])?;
        Ok(())
    }

    fn audit_source(ctx: &Ctx) -> Result<usize, Error> {
        let source: Obj = ctx.get_as("source")?;
        source.add_role("SourceAccount", ctx)?;
        let proxy = ctx.init_sub_context(Ctx::new(Audit::new(&source)));
        proxy.call("run_audit", args![])?;
        let entries: Vec<String> = proxy.get_as("entries")?;
        Ok(entries.len())
    }
}

data_object! {
    impl TransferMoney {
        bindings: bindings;
        methods {
            pub op transfer(ctx, amount: f64);
            pub op audit_source(ctx);
        }
        properties {
            pub source: Obj;
            pub destination: Obj;
        }
    }
}

impl Context for TransferMoney {
    fn role_definitions(&self) -> &'static [&'static RoleDef] {
        static ROLES: [&RoleDef; 5] = [
            &SOURCE_ACCOUNT,
            &DESTINATION_ACCOUNT,
            &SHADOWING,
            &PRIVATE_SHADOW,
            &DOUBLE_SOURCE,
        ];
        &ROLES
    }

    fn context_state(&self) -> &ContextState {
        &self.state
    }

    fn context_state_mut(&mut self) -> &mut ContextState {
        &mut self.state
    }
}

role! {
    pub static RECORDER: "Recorder" {
        fn record(scope) {
            let owner: String = scope.get_as("owner")?;
            let ctx = scope.context();
            let mut entries: Vec<String> = ctx.get_as("entries")?;
            entries.push(owner);
            // The parent's bindings must be shadowed while we run.
            if scope.object().has_role_method("withdraw") {
                entries.push("shadow-leak".to_owned());
            }
            ctx.set("entries", Value::new(entries))?;
        }
    }
}

/// A sub-context: records the owner of its subject account.
pub struct Audit {
    subject: Obj,
    entries: Vec<String>,
    state: ContextState,
    bindings: Bindings,
}

impl Audit {
    pub fn new(subject: &Obj) -> Audit {
        Audit {
            subject: subject.clone(),
            entries: Vec::new(),
            state: ContextState::new(),
            bindings: Bindings::new(),
        }
    }

    fn run_audit(ctx: &Ctx) -> Result<(), Error> {
        let subject: Obj = ctx.get_as("subject")?;
        subject.add_role("Recorder", ctx)?;
        subject.call("record", args![])?;
        Ok(())
    }
}

data_object! {
    impl Audit {
        bindings: bindings;
        methods {
            pub op run_audit(ctx);
        }
        properties {
            pub subject: Obj;
            pub entries: Vec<String>;
        }
    }
}

impl Context for Audit {
    fn role_definitions(&self) -> &'static [&'static RoleDef] {
        static ROLES: [&RoleDef; 1] = [&RECORDER];
        &ROLES
    }

    fn context_state(&self) -> &ContextState {
        &self.state
    }

    fn context_state_mut(&mut self) -> &mut ContextState {
        &mut self.state
    }
}

role! {
    pub static INSPECTOR: "Inspector" {
        fn peek(scope) {
            scope.get("shoe_size")?.is_unit()
        }
    }
}

/// A context with the lenient undefined-property policy.
#[derive(Default)]
pub struct Probe {
    state: ContextState,
    bindings: Bindings,
}

data_object! {
    impl Probe {
        bindings: bindings;
    }
}

impl Context for Probe {
    fn role_definitions(&self) -> &'static [&'static RoleDef] {
        static ROLES: [&RoleDef; 1] = [&INSPECTOR];
        &ROLES
    }

    fn property_policy(&self) -> PropertyPolicy {
        PropertyPolicy::Lenient
    }

    fn context_state(&self) -> &ContextState {
        &self.state
    }

    fn context_state_mut(&mut self) -> &mut ContextState {
        &mut self.state
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
