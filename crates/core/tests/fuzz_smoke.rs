//! Fuzz smoke tests for the tokenizer, parser and printer.
//!
//! Random, adversarial and edge-case inputs must never panic. Inputs that
//! do parse must print to text that parses back to the same message.
//!
//! A small deterministic PRNG keeps runs reproducible.

mod common;

use common::{POOL, full_parser, message_type, test_message};
use txtpb_core::escape::unescape_bytes;
use txtpb_core::prost_reflect::DynamicMessage;
use txtpb_core::{OutputMode, Parser, Printer, Tokenizer};

// ─── Simple deterministic PRNG (LCG) ────────────────────────────────────────

struct SimpleRng(u64);

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range(&mut self, max: usize) -> usize {
        (self.next() >> 33) as usize % max
    }

    fn gen_bytes(&mut self, len: usize) -> Vec<u8> {
        (0..len).map(|_| (self.next() >> 56) as u8).collect()
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.gen_range(items.len())]
    }
}

// ─── Invariant checking ─────────────────────────────────────────────────────

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// Tokenize to the end; every token must be a non-empty slice of the input
/// and locations must not go backwards.
fn drain_tokens(input: &str) {
    let mut tokenizer = Tokenizer::new(input);
    let mut last = tokenizer.location();
    let mut count = 0usize;
    while !tokenizer.at_end() {
        assert!(!tokenizer.current().is_empty());
        assert!(input.contains(tokenizer.current()));
        tokenizer.next_token();
        let here = tokenizer.location();
        assert!(here >= last, "location went backwards in {:?}", truncate(input, 120));
        last = here;
        count += 1;
        assert!(count <= input.len(), "tokenizer did not advance");
    }
}

/// Parse with a permissive and a strict parser. A successful parse must
/// survive a print/parse round trip in both output modes.
fn check_input(input: &str) {
    drain_tokens(input);

    let strict = full_parser().build();
    let lenient = full_parser()
        .allow_unknown_fields(true)
        .allow_unknown_enum_values(true)
        .build();

    for parser in [&strict, &lenient] {
        let Ok(message) = parser.parse(input, test_message()) else {
            continue;
        };
        for mode in [OutputMode::MultiLine, OutputMode::SingleLine] {
            let text = Printer::new().print_to_string(&message, mode);
            let reparsed = strict.parse(&text, test_message()).unwrap_or_else(|e| {
                panic!(
                    "printed text failed to parse: {e}\ninput: {:?}\ntext: {text:?}",
                    truncate(input, 120)
                )
            });
            assert_messages_equal(&message, &reparsed, input);
        }
    }

    let _ = Parser::default().parse(input, message_type("Recursive"));
}

/// NaN never equals itself, so compare printed forms instead.
fn assert_messages_equal(a: &DynamicMessage, b: &DynamicMessage, input: &str) {
    let left = Printer::new().short_debug_string(a);
    let right = Printer::new().short_debug_string(b);
    assert_eq!(left, right, "round trip changed input {:?}", truncate(input, 120));
}

// ─── Random byte soup ───────────────────────────────────────────────────────

#[test]
fn random_bytes_never_panic() {
    let mut rng = SimpleRng::new(0x5EED);
    for _ in 0..500 {
        let len = rng.gen_range(64);
        let bytes = rng.gen_bytes(len);
        let input = String::from_utf8_lossy(&bytes);
        check_input(&input);
    }
}

#[test]
fn random_escapes_never_panic() {
    let mut rng = SimpleRng::new(42);
    let pieces = [
        "\\", "\\x", "\\x4", "\\u00", "\\U0010FFFF", "\\U00110000", "\\ud800", "\\777", "\\0",
        "\\n", "a", "é", "\"", "'",
    ];
    for _ in 0..500 {
        let input: String = (0..rng.gen_range(8)).map(|_| rng.pick(&pieces)).collect();
        let _ = unescape_bytes(&input);
        check_input(&format!("string_value: \"{input}\""));
        check_input(&format!("bytes_value: '{input}'"));
    }
}

// ─── Grammar-aware fragments ────────────────────────────────────────────────

const FRAGMENTS: &[&str] = &[
    "int32_value", "int64_value", "uint32_value", "float_value", "double_value", "bool_value",
    "string_value", "bytes_value", "color", "inner", "repeated_int32", "repeated_inner",
    "int_map", "string_map", "MyGroup", "mygroup", "choice_int", "choice_string", "any_value",
    "bogus", "[txtpb.test.ext_int]", "[txtpb.test.ext_inner]", "[txtpb.test.nope]",
    "[type.googleapis.com/txtpb.test.Inner]", "key", "value", "a", "b", "r", ":", ":", ":",
    "{", "}", "<", ">", "[", "]", ",", ";", "1", "-1", "0x10", "017", "2147483648", "1.5",
    "-inf", "nan", "1e400", "true", "f", "RED", "BLUE", "7", "'x'", "\"y\"", "'\\001'", "#c\n",
    "\n", " ",
];

#[test]
fn random_fragments_never_panic() {
    let mut rng = SimpleRng::new(7);
    for _ in 0..2000 {
        let count = rng.gen_range(24);
        let input = (0..count)
            .map(|_| rng.pick(FRAGMENTS))
            .collect::<Vec<_>>()
            .join(" ");
        check_input(&input);
    }
}

// ─── Edge cases ─────────────────────────────────────────────────────────────

#[test]
fn edge_cases_never_panic() {
    let deep = "inner {".repeat(200);
    let deep_any = "any_value { [type.googleapis.com/txtpb.test.TestMessage] { ".repeat(120);
    let cases: Vec<&str> = vec![
        "",
        " ",
        "#",
        "\"",
        "'",
        "[",
        "]",
        "{",
        "}",
        ":",
        "int32_value",
        "int32_value:",
        "int32_value: ",
        "int32_value: -",
        "int32_value: 0x",
        "inner {",
        "inner <}",
        "repeated_int32: [",
        "repeated_int32: [1,",
        "repeated_int32: [,]",
        "int_map { key: }",
        "any_value { [",
        "any_value { [type.googleapis.com/",
        "any_value { [/] {} }",
        "[txtpb.test.",
        "[.]: 1",
        "bogus: [",
        "bogus [ 1 ]",
        "string_value: \"\\",
        "string_value: 'unterminated\n'",
        "\u{feff}int32_value: 1",
        "int32_value: 1\u{0}",
        deep.as_str(),
        deep_any.as_str(),
    ];
    for case in cases {
        check_input(case);
    }
}

#[test]
fn every_message_type_accepts_empty_input() {
    let parser = full_parser().build();
    for descriptor in POOL.all_messages() {
        let message = parser.parse("", descriptor.clone()).unwrap();
        assert_eq!(message, DynamicMessage::new(descriptor));
    }
}
