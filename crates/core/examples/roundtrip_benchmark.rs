//! Lightweight parse/print benchmark harness for local baselines.
//!
//! Run from repository root:
//! `cargo run -p txtpb_core --example roundtrip_benchmark --release`

use std::time::Instant;

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet};
use txtpb_core::prost_reflect::{DescriptorPool, MessageDescriptor};
use txtpb_core::{OutputMode, Parser, Printer};

fn field(name: &str, number: i32, label: Label, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

fn record_type() -> Result<MessageDescriptor, String> {
    let children = FieldDescriptorProto {
        type_name: Some(".bench.Record".to_string()),
        ..field("children", 4, Label::Repeated, Type::Message)
    };
    let file = FileDescriptorProto {
        name: Some("bench.proto".to_string()),
        package: Some("bench".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("Record".to_string()),
            field: vec![
                field("name", 1, Label::Optional, Type::String),
                field("id", 2, Label::Optional, Type::Int64),
                field("values", 3, Label::Repeated, Type::Double),
                children,
            ],
            ..Default::default()
        }],
        syntax: Some("proto2".to_string()),
        ..Default::default()
    };
    let pool = DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] })
        .map_err(|e| format!("invalid benchmark schema: {e}"))?;
    pool.get_message_by_name("bench.Record")
        .ok_or_else(|| "bench.Record missing from pool".to_string())
}

/// `width` children per level, `depth` levels deep.
fn sample_text(width: usize, depth: usize) -> String {
    fn record(out: &mut String, id: usize, width: usize, depth: usize) {
        out.push_str(&format!(
            "name: \"record #{id} \\303\\251\" id: {id} values: [1.5, -2.25e10, inf] "
        ));
        if depth == 0 {
            return;
        }
        for child in 0..width {
            out.push_str("children { ");
            record(out, id * width + child + 1, width, depth - 1);
            out.push_str("} ");
        }
    }
    let mut out = String::new();
    record(&mut out, 0, width, depth);
    out
}

fn run_benchmark(
    label: &str,
    input: &str,
    descriptor: &MessageDescriptor,
    iterations: usize,
) -> Result<(), String> {
    let parser = Parser::default();
    let printer = Printer::new();

    let parse_start = Instant::now();
    for _ in 0..iterations {
        let _ = parser.parse(input, descriptor.clone());
    }
    let parse_elapsed = parse_start.elapsed();

    let parsed = parser
        .parse(input, descriptor.clone())
        .map_err(|e| format!("{label}: sample does not parse: {e}"))?;

    let print_start = Instant::now();
    for _ in 0..iterations {
        let _ = printer.print_to_string(&parsed, OutputMode::MultiLine);
    }
    let print_elapsed = print_start.elapsed();

    println!("Benchmark: {label}");
    println!("  input_bytes: {}", input.len());
    println!(
        "  parse: total={:?}, per_iter={:.3} ms",
        parse_elapsed,
        parse_elapsed.as_secs_f64() * 1000.0 / iterations as f64
    );
    println!(
        "  print: total={:?}, per_iter={:.3} ms",
        print_elapsed,
        print_elapsed.as_secs_f64() * 1000.0 / iterations as f64
    );
    Ok(())
}

fn main() -> Result<(), String> {
    let descriptor = record_type()?;
    let iterations = std::env::var("TXTPB_BENCH_ITERS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(200);

    for (label, width, depth) in [("wide", 40, 1), ("deep", 1, 90), ("tree", 4, 4)] {
        run_benchmark(label, &sample_text(width, depth), &descriptor, iterations)?;
    }
    Ok(())
}
