use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, Criterion};
use ragchat::backend::{Backend, ChatReply, HealthStatus, UploadReceipt};
use ragchat::{SelectedFile, Session, TransportError};
use std::hint::black_box;
use std::sync::Arc;

/// Answers immediately so only the session bookkeeping is measured.
struct InstantBackend;

#[async_trait]
impl Backend for InstantBackend {
    async fn upload(&self, _file: &SelectedFile) -> Result<UploadReceipt, TransportError> {
        Ok(UploadReceipt::default())
    }

    async fn chat(&self, query: &str) -> Result<ChatReply, TransportError> {
        Ok(ChatReply {
            response: Some(query.to_uppercase()),
            sources: vec!["doc.txt".into()],
            error: None,
        })
    }

    async fn health(&self) -> Result<HealthStatus, TransportError> {
        Ok(HealthStatus {
            message: "ok".into(),
        })
    }
}

fn bench_session(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let session = Session::new(Arc::new(InstantBackend));
    session.select_file(Some(SelectedFile::new("doc.txt", vec![b'a'; 64 * 1024])));

    c.bench_function("query_cycle", |b| {
        b.to_async(&runtime).iter(|| async {
            let answer = session.ask(black_box("what is in the document?")).await;
            black_box(answer.expect("answer"))
        })
    });

    c.bench_function("upload_cycle_64k", |b| {
        b.to_async(&runtime)
            .iter(|| async { black_box(session.upload().await.expect("upload")) })
    });

    c.bench_function("snapshot", |b| b.iter(|| black_box(session.snapshot())));
}

criterion_group!(benches, bench_session);
criterion_main!(benches);
