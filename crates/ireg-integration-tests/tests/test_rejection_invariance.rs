//! # Rejection Invariance: Property Tests
//!
//! Random operation sequences from a small cast of principals. After every
//! step: a rejected operation leaves the state bit-for-bit unchanged, a
//! committed one bumps the version by exactly one, no principal is both
//! pending and registered, and the audit chain stays intact.

use ireg_core::Principal;
use ireg_registry::{Registry, RegistryState};
use proptest::prelude::*;

const CAST: [&str; 5] = ["SP1OWNER", "SP1ADMIN", "SP1UNIA", "SP1UNIB", "SP1STRANGER"];

fn who(i: usize) -> Principal {
    Principal::new(CAST[i % CAST.len()]).unwrap()
}

#[derive(Debug, Clone)]
enum Op {
    Transfer(usize, usize),
    AddAdmin(usize, usize),
    RemoveAdmin(usize, usize),
    SetPaused(usize, bool),
    Submit(usize, usize, bool),
    Approve(usize, usize),
    Reject(usize, usize),
    Update(usize, usize),
    Unverify(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let idx = || 0..CAST.len();
    prop_oneof![
        1 => (idx(), idx()).prop_map(|(a, b)| Op::Transfer(a, b)),
        2 => (idx(), idx()).prop_map(|(a, b)| Op::AddAdmin(a, b)),
        1 => (idx(), idx()).prop_map(|(a, b)| Op::RemoveAdmin(a, b)),
        2 => (idx(), any::<bool>()).prop_map(|(a, v)| Op::SetPaused(a, v)),
        4 => (idx(), 0usize..120, any::<bool>()).prop_map(|(a, n, proof)| Op::Submit(a, n, proof)),
        3 => (idx(), idx()).prop_map(|(a, b)| Op::Approve(a, b)),
        2 => (idx(), idx()).prop_map(|(a, b)| Op::Reject(a, b)),
        2 => (idx(), 0usize..120).prop_map(|(a, n)| Op::Update(a, n)),
        2 => (idx(), idx()).prop_map(|(a, b)| Op::Unverify(a, b)),
    ]
}

fn apply(registry: &Registry, op: &Op) -> bool {
    match *op {
        Op::Transfer(c, t) => registry.transfer_ownership(&who(c), &who(t)).is_ok(),
        Op::AddAdmin(c, t) => registry.add_admin(&who(c), &who(t)).is_ok(),
        Op::RemoveAdmin(c, t) => registry.remove_admin(&who(c), &who(t)).is_ok(),
        Op::SetPaused(c, v) => registry.set_paused(&who(c), v).is_ok(),
        Op::Submit(c, name_len, with_proof) => {
            let proof: &[u8] = if with_proof { b"proof" } else { b"" };
            registry
                .submit_registration(&who(c), &"n".repeat(name_len), "https://u.edu", "0x01", proof)
                .is_ok()
        }
        Op::Approve(c, t) => registry.approve_registration(&who(c), &who(t)).is_ok(),
        Op::Reject(c, t) => registry.reject_registration(&who(c), &who(t)).is_ok(),
        Op::Update(c, name_len) => registry
            .update_profile(&who(c), &"m".repeat(name_len), "https://v.edu", "0x02")
            .is_ok(),
        Op::Unverify(c, t) => registry.unverify_institution(&who(c), &who(t)).is_ok(),
    }
}

fn disjoint(state: &RegistryState) -> bool {
    state
        .pending()
        .iter()
        .all(|(principal, _)| !state.profiles().contains(principal))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn rejected_operations_change_nothing(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let registry = Registry::new(who(0)).unwrap();
        registry.add_admin(&who(0), &who(1)).unwrap();

        for op in &ops {
            let before = registry.snapshot();
            let committed = apply(&registry, op);
            let after = registry.snapshot();

            if committed {
                prop_assert_eq!(after.version(), before.version() + 1, "{:?}", op);
                prop_assert_eq!(after.events().len(), before.events().len() + 1);
            } else {
                prop_assert_eq!(&after, &before, "{:?} was rejected but changed state", op);
            }
            prop_assert!(disjoint(&after));
            prop_assert!(!after.owner().is_null());
        }

        let end = registry.snapshot();
        prop_assert!(end.events().verify_chain().is_ok());
        prop_assert_eq!(end.version(), end.events().len() as u64);
    }

    #[test]
    fn name_limit_boundary(len in 0usize..150) {
        let registry = Registry::new(who(0)).unwrap();
        let result = registry.submit_registration(&who(2), &"x".repeat(len), "https://u.edu", "0x01", b"p");
        prop_assert_eq!(result.is_ok(), (1..=100).contains(&len));
    }
}
