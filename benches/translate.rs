use std::sync::Arc;

use chatrelay_rs::protocol::completion::parse_completion_sse_line;
use chatrelay_rs::protocol::datastream::encode_data_part;
use chatrelay_rs::stream::{CompletionTranslator, Translate};
use chatrelay_rs::tools::builtin_registry;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sample_stream_lines() -> Vec<String> {
    let mut lines = Vec::with_capacity(70);
    for i in 0..32 {
        lines.push(format!(
            "data: {{\"choices\":[{{\"index\":0,\"delta\":{{\"content\":\"token {i} \"}},\"finish_reason\":null}}]}}"
        ));
    }
    lines.push(
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"t1\",\"function\":{\"name\":\"add\",\"arguments\":\"\"}}]},\"finish_reason\":null}]}".to_string(),
    );
    for fragment in ["{\\\"a\\\":20,", "\\\"b\\\":22}"] {
        lines.push(format!(
            "data: {{\"choices\":[{{\"index\":0,\"delta\":{{\"tool_calls\":[{{\"index\":0,\"function\":{{\"arguments\":\"{fragment}\"}}}}]}},\"finish_reason\":null}}]}}"
        ));
    }
    lines.push(
        "data: {\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"tool_calls\"}]}"
            .to_string(),
    );
    lines.push(
        "data: {\"choices\":[],\"usage\":{\"prompt_tokens\":120,\"completion_tokens\":48}}"
            .to_string(),
    );
    lines
}

fn bench_completion_translate(c: &mut Criterion) {
    let tools = Arc::new(builtin_registry().expect("registry"));
    let lines = sample_stream_lines();

    c.bench_function("completion_translate_encode", |b| {
        b.iter(|| {
            let mut translator = CompletionTranslator::new(Arc::clone(&tools));
            let mut parts = Vec::with_capacity(8);
            let mut written = 0usize;
            for line in &lines {
                let Some(chunk) = parse_completion_sse_line(line) else {
                    continue;
                };
                parts.clear();
                translator.consume(chunk, &mut parts);
                for part in &parts {
                    written += encode_data_part(part).len();
                }
            }
            black_box(written)
        });
    });
}

criterion_group!(benches, bench_completion_translate);
criterion_main!(benches);
