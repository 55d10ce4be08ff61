use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use diedat_rs::{
    AppContext, MaskScorer, PairClassifier, candidates::CandidateScores, error::ModelError,
    server,
};
use tower::ServiceExt;

/// Masked-language stand-in that returns fixed scores.
pub struct FakeScorer {
    scores: [f32; 4],
    calls: AtomicUsize,
}

impl FakeScorer {
    pub fn new(scores: [f32; 4]) -> Arc<Self> {
        Arc::new(Self {
            scores,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MaskScorer for FakeScorer {
    fn mask_token(&self) -> &str {
        "<mask>"
    }

    fn score(&self, _query: &str) -> Result<CandidateScores, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CandidateScores(self.scores))
    }
}

pub struct FakeClassifier {
    logits: [f32; 2],
}

impl FakeClassifier {
    pub fn new(logits: [f32; 2]) -> Arc<Self> {
        Arc::new(Self { logits })
    }
}

impl PairClassifier for FakeClassifier {
    fn classify(&self, _query: &str) -> Result<[f32; 2], ModelError> {
        Ok(self.logits)
    }
}

pub fn app(scorer: Option<Arc<FakeScorer>>, classifier: Option<Arc<FakeClassifier>>) -> Router {
    let mut context = AppContext::default();
    if let Some(scorer) = scorer {
        context = context.with_mlm(scorer);
    }
    if let Some(classifier) = classifier {
        context = context.with_classifier(classifier);
    }
    server::router(context)
}

/// POSTs `sentence` form-encoded and returns status, content type and body.
pub async fn post_sentence(
    app: Router,
    uri: &str,
    sentence: &str,
) -> (StatusCode, Option<String>, String) {
    let body = serde_urlencoded::to_string([("sentence", sentence)]).expect("form encodes");
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("request builds");

    let response = app.oneshot(request).await.expect("router responds");
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let text = String::from_utf8(bytes.to_vec()).expect("utf-8 body");
    (status, content_type, text)
}
