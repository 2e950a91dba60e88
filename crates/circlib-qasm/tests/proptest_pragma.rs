//! Property-based tests for the remote-gate pragma protocol.
//!
//! Checks that encoding then decoding recovers the gate, and that
//! declaration deduplication keeps every non-declaration line in order.

use circlib_qasm::{
    OPAQUE_KEYWORD, ProgramBuilder, RESERVED_NAMES, RemoteGate, dedup_opaque_declarations,
    remote_gates,
};
use proptest::prelude::*;

/// Template-like names: a letter followed by identifier characters.
fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z][A-Za-z0-9_]{0,11}",
        "(opaque|Opaque|GATE|measure|if)[A-Za-z0-9_]{0,3}",
    ]
}

/// A reserved statement keyword in random case.
fn arb_keyword() -> impl Strategy<Value = String> {
    (prop::sample::select(RESERVED_NAMES.to_vec()), any::<u16>()).prop_map(|(kw, mask)| {
        kw.chars()
            .enumerate()
            .map(|(i, c)| if (mask >> (i % 16)) & 1 == 1 { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

fn is_declaration(line: &str) -> bool {
    line.split_whitespace().next() == Some(OPAQUE_KEYWORD)
}

/// Rendered `name=value` arguments, including bracketed arrays.
fn arb_param() -> impl Strategy<Value = String> {
    let value = prop_oneof![
        "-?[0-9]{1,4}",
        "[a-z]{1,6}",
        Just("true".to_string()),
        prop::collection::vec(0_u32..16, 0..4).prop_map(|v| format!(
            "[{}]",
            v.iter().map(u32::to_string).collect::<Vec<_>>().join(",")
        )),
    ];
    ("[a-z_]{1,8}", value).prop_map(|(k, v)| format!("{k}={v}"))
}

fn arb_gate() -> impl Strategy<Value = RemoteGate> {
    (
        arb_name(),
        1_u32..=6,
        prop::collection::vec(arb_param(), 0..4),
    )
        .prop_filter_map("reserved name", |(name, n, params)| {
            RemoteGate::new(name, n, params).ok()
        })
}

proptest! {
    #[test]
    fn prop_pragma_round_trip(gate in arb_gate()) {
        let block = gate.to_pragma();
        prop_assert_eq!(block.lines().count(), 4);

        let decoded = RemoteGate::from_pragma(&block).unwrap();
        prop_assert_eq!(decoded.name(), gate.name());
        prop_assert_eq!(decoded.num_qubits(), gate.num_qubits());
        prop_assert_eq!(decoded.params(), gate.params());
    }

    #[test]
    fn prop_keyword_names_are_rejected(name in arb_keyword(), n in 1_u32..=4) {
        prop_assert!(RemoteGate::new(name, n, ["n=1"]).is_err());
    }

    #[test]
    fn prop_dedup_declares_each_gate_once(
        gates in prop::collection::vec(arb_gate(), 1..5),
        picks in prop::collection::vec(0_usize..5, 1..10),
    ) {
        let num_qubits = gates.iter().map(RemoteGate::num_qubits).max().unwrap();
        let mut builder = ProgramBuilder::new(num_qubits, 0);

        let mut used: Vec<&RemoteGate> = Vec::new();
        for &pick in &picks {
            let gate = &gates[pick % gates.len()];
            let qubits: Vec<u32> = (0..gate.num_qubits()).collect();
            builder.remote_gate(gate, &qubits).unwrap();
            used.push(gate);
        }
        let text = builder.build().into_string();
        let out = dedup_opaque_declarations(&text);

        let mut declared: Vec<&str> = out
            .lines()
            .filter(|l| is_declaration(l))
            .filter_map(|l| l.split_whitespace().nth(1))
            .collect();
        let total = declared.len();
        declared.sort_unstable();
        declared.dedup();
        prop_assert_eq!(total, declared.len());

        let kept: Vec<&str> = text.lines().filter(|l| !is_declaration(l)).collect();
        let kept_out: Vec<&str> = out.lines().filter(|l| !is_declaration(l)).collect();
        prop_assert_eq!(kept, kept_out);

        prop_assert_eq!(dedup_opaque_declarations(&out), out.clone());
        let decoded: Vec<u32> = remote_gates(&out)
            .unwrap()
            .iter()
            .map(RemoteGate::num_qubits)
            .collect();
        let expected: Vec<u32> = used.iter().map(|g| g.num_qubits()).collect();
        prop_assert_eq!(decoded, expected);
    }
}
