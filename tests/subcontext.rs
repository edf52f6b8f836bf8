mod common;

use common::{Audit, TransferMoney, account};
use rolecast::{ContextScope, Ctx, Error, args};

#[test]
fn proxied_calls_retarget_shared_players() {
    let savings = account(0.0, "ada");
    let checking = account(0.0, "ada");
    let ctx = ContextScope::enter(Ctx::new(TransferMoney::new(&savings, &checking)));

    let entries = ctx.call_as::<usize>("audit_source", args![]).unwrap();
    assert_eq!(entries, 1);

    // The parent's bindings survived the nested call intact.
    assert!(savings.has_role_method("withdraw"));
    assert!(!savings.has_role_method("record"));
    assert_eq!(savings.current_context().unwrap(), *ctx.context());
}

#[test]
fn parent_roles_are_shadowed_during_the_nested_call() {
    let savings = account(0.0, "grace");
    let checking = account(0.0, "grace");
    let ctx = ContextScope::enter(Ctx::new(TransferMoney::new(&savings, &checking)));

    savings.add_role("SourceAccount", &ctx).unwrap();
    let proxy = ctx.init_sub_context(Ctx::new(Audit::new(&savings)));
    proxy.call("run_audit", args![]).unwrap();

    // "Recorder" appends a marker entry if it can still see the parent's
    // "withdraw" while it runs; a clean shadow records the owner only.
    let entries = proxy.get_as::<Vec<String>>("entries").unwrap();
    assert_eq!(entries, vec!["grace".to_owned()]);
}

#[test]
fn snapshots_are_restored_after_the_nested_call() {
    let savings = account(10.0, "ada");
    let checking = account(0.0, "ada");
    let ctx = ContextScope::enter(Ctx::new(TransferMoney::new(&savings, &checking)));

    savings.add_role("SourceAccount", &ctx).unwrap();
    let proxy = ctx.init_sub_context(Ctx::new(Audit::new(&savings)));
    proxy.call("run_audit", args![]).unwrap();

    assert_eq!(savings.current_context().unwrap(), *ctx.context());
    savings.call("withdraw", args![4.0_f64]).unwrap();
    assert_eq!(savings.call_as::<f64>("balance", args![]).unwrap(), 6.0);

    // The child's table is still installed, just not current.
    let err = savings.call("record", args![]).unwrap_err();
    assert!(matches!(err, Error::BadMethodCall { .. }));
}

#[test]
fn players_are_restored_when_the_proxied_call_fails() {
    let savings = account(0.0, "ada");
    let checking = account(0.0, "ada");
    let ctx = ContextScope::enter(Ctx::new(TransferMoney::new(&savings, &checking)));

    savings.add_role("SourceAccount", &ctx).unwrap();
    let proxy = ctx.init_sub_context(Ctx::new(Audit::new(&savings)));

    let err = proxy.call("misfiled", args![]).unwrap_err();
    assert!(matches!(err, Error::BadMethodCall { .. }));

    // The failed call must not leave the player pointing at the child.
    assert_eq!(savings.current_context().unwrap(), *ctx.context());
    assert!(savings.has_role_method("withdraw"));
}

#[test]
fn players_first_bound_inside_the_nested_call_keep_the_child() {
    let savings = account(0.0, "ada");
    let checking = account(0.0, "ada");
    let witness = account(0.0, "lin");
    let ctx = ContextScope::enter(Ctx::new(TransferMoney::new(&savings, &checking)));

    // `witness` plays no role in the parent, so it is absent from the
    // snapshot and adopts the child on first binding.
    let proxy = ctx.init_sub_context(Ctx::new(Audit::new(&witness)));
    proxy.call("run_audit", args![]).unwrap();

    assert_eq!(witness.current_context().unwrap(), *proxy.context());
    assert!(witness.has_role_method("record"));
}

#[test]
fn raw_child_handles_do_not_retarget_players() {
    let savings = account(0.0, "ada");
    let checking = account(0.0, "ada");
    let ctx = ContextScope::enter(Ctx::new(TransferMoney::new(&savings, &checking)));

    savings.add_role("SourceAccount", &ctx).unwrap();

    // Bypassing init_sub_context: the child binds its role, but the player
    // keeps dispatching against the parent, so "record" never resolves.
    let child = Ctx::new(Audit::new(&savings));
    let err = child.call("run_audit", args![]).unwrap_err();
    match err {
        Error::BadMethodCall { data, method } => {
            assert_eq!(data, "Account");
            assert_eq!(method, "record");
        }
        other => panic!("unexpected error: {other}"),
    }
    child.remove_all_roles().unwrap();
}

#[test]
fn proxy_teardown_unbinds_the_child_only() {
    let savings = account(0.0, "ada");
    let checking = account(0.0, "ada");
    let ctx = ContextScope::enter(Ctx::new(TransferMoney::new(&savings, &checking)));

    savings.add_role("SourceAccount", &ctx).unwrap();
    let proxy = ctx.init_sub_context(Ctx::new(Audit::new(&savings)));
    proxy.call("run_audit", args![]).unwrap();

    proxy.remove_all_roles().unwrap();
    assert!(savings.has_role_method("withdraw"));
    assert_eq!(proxy.context().players().len(), 0);
}
