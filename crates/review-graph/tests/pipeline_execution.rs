//! End-to-end pipeline tests with a scripted text generator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use review_graph::{
    render_text, ExecutorConfig, GenerationError, PipelineExecutor, PipelineGraph, ReviewError,
    ReviewField, ReviewNode, ReviewOutcome, ReviewPipeline, ReviewPrompts, ReviewState,
    StaticDiffSource, TextGenerator, DEPENDENCY_SKIP, NO_CHANGES_MESSAGE, TEST_COVERAGE_SKIP,
    UI_SKIP,
};

const README_DIFF: &str = "diff --git a/README.md b/README.md\n\
--- a/README.md\n\
+++ b/README.md\n\
@@ -1 +1,2 @@\n\
 # App\n\
+Install with gradle.\n";

const COMPOSE_DIFF: &str = "diff --git a/app/Greeting.kt b/app/Greeting.kt\n\
+@Composable\n\
+fun Greeting(name: String) { Text(\"Hello $name\") }\n";

enum Script {
    Fail(&'static str),
    Stall,
}

/// Identifies the calling node from the prompt, records call order and
/// replies `"<node> says hi"` unless scripted otherwise.
#[derive(Default)]
struct ScriptedGenerator {
    calls: Mutex<Vec<ReviewNode>>,
    scripts: HashMap<ReviewNode, Script>,
}

impl ScriptedGenerator {
    fn failing(node: ReviewNode, message: &'static str) -> Self {
        Self {
            scripts: HashMap::from([(node, Script::Fail(message))]),
            ..Default::default()
        }
    }

    fn stalling(node: ReviewNode) -> Self {
        Self {
            scripts: HashMap::from([(node, Script::Stall)]),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<ReviewNode> {
        self.calls.lock().unwrap().clone()
    }
}

fn caller(prompt: &str) -> ReviewNode {
    ReviewNode::ALL
        .into_iter()
        .find(|node| prompt.starts_with(ReviewPrompts::instruction(*node)))
        .unwrap_or_else(|| panic!("unrecognised prompt: {prompt}"))
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _model: &str, prompt: &str) -> Result<String, GenerationError> {
        let node = caller(prompt);
        self.calls.lock().unwrap().push(node);

        match self.scripts.get(&node) {
            Some(Script::Fail(message)) => Err(GenerationError::Request(message.to_string())),
            Some(Script::Stall) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(String::new())
            }
            None => Ok(format!("  {node} says hi\n")),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn executor(generator: Arc<ScriptedGenerator>, parallelism: usize) -> PipelineExecutor {
    PipelineExecutor::new(
        generator,
        ExecutorConfig::default().with_parallelism(parallelism),
    )
}

#[tokio::test]
async fn test_empty_diff_reports_no_changes() {
    let generator = Arc::new(ScriptedGenerator::default());
    let pipeline = ReviewPipeline::new(
        StaticDiffSource::new(""),
        executor(Arc::clone(&generator), 4),
        PipelineGraph::full_review().unwrap(),
    );

    let outcome = pipeline.run("staged").await.unwrap();

    assert_eq!(outcome, ReviewOutcome::NoChanges);
    assert!(generator.calls().is_empty());
    assert_eq!(NO_CHANGES_MESSAGE, "No changes to review.");
}

#[tokio::test]
async fn test_readme_diff_writes_skip_messages() {
    let generator = Arc::new(ScriptedGenerator::default());
    let graph = PipelineGraph::full_review().unwrap();
    let outcome = executor(Arc::clone(&generator), 4)
        .review(&graph, README_DIFF)
        .await
        .unwrap();

    let ReviewOutcome::Reviewed(state) = outcome else {
        panic!("expected a review");
    };

    assert_eq!(state.diff(), README_DIFF);
    assert_eq!(state.text(ReviewField::TestCoverageFeedback), TEST_COVERAGE_SKIP);
    assert_eq!(state.text(ReviewField::UiFeedback), UI_SKIP);
    assert_eq!(state.text(ReviewField::DependencyFeedback), DEPENDENCY_SKIP);

    for field in [
        ReviewField::Summary,
        ReviewField::Critique,
        ReviewField::Suggestions,
        ReviewField::SecurityFeedback,
        ReviewField::ArchitectureFeedback,
        ReviewField::PerformanceFeedback,
        ReviewField::ReadabilityFeedback,
    ] {
        assert!(!state.text(field).is_empty(), "{field} should be generated");
    }
    // Responses are trimmed before they are stored.
    assert_eq!(state.text(ReviewField::Summary), "summarize says hi");

    let calls = generator.calls();
    assert_eq!(calls.len(), 7);
    assert!(!calls.contains(&ReviewNode::TestCoverage));
    assert!(!calls.contains(&ReviewNode::Ui));
    assert!(!calls.contains(&ReviewNode::Dependency));

    let report = render_text(&graph, &state);
    assert!(report.starts_with("🧠 Commit Summary:\nsummarize says hi"));
    assert!(report.contains(&format!("✅ Test Coverage:\n{TEST_COVERAGE_SKIP}")));
}

#[tokio::test]
async fn test_spine_runs_in_order_before_branches() {
    let generator = Arc::new(ScriptedGenerator::default());
    let graph = PipelineGraph::full_review().unwrap();
    let mut state = ReviewState::for_diff(COMPOSE_DIFF).unwrap();

    let summary = executor(Arc::clone(&generator), 8)
        .run(&graph, &mut state)
        .await
        .unwrap();

    let calls = generator.calls();
    assert_eq!(&calls[..3], &ReviewNode::SPINE);
    assert!(calls[3..].iter().all(|node| !node.is_spine()));
    assert_eq!(&summary.executed[..3], &ReviewNode::SPINE);
}

#[tokio::test]
async fn test_composable_makes_ui_applicable() {
    let generator = Arc::new(ScriptedGenerator::default());
    let graph = PipelineGraph::review(&[ReviewNode::Ui]).unwrap();
    let mut state = ReviewState::for_diff(COMPOSE_DIFF).unwrap();

    let summary = executor(Arc::clone(&generator), 1)
        .run(&graph, &mut state)
        .await
        .unwrap();

    assert_eq!(state.text(ReviewField::UiFeedback), "ui says hi");
    assert!(generator.calls().contains(&ReviewNode::Ui));
    assert!(summary.skipped.is_empty());
}

#[tokio::test]
async fn test_skipped_test_coverage_never_calls_generator() {
    let generator = Arc::new(ScriptedGenerator::default());
    let graph = PipelineGraph::review(&[ReviewNode::TestCoverage]).unwrap();
    let mut state = ReviewState::for_diff(README_DIFF).unwrap();

    let summary = executor(Arc::clone(&generator), 1)
        .run(&graph, &mut state)
        .await
        .unwrap();

    assert_eq!(generator.calls(), ReviewNode::SPINE.to_vec());
    assert_eq!(summary.skipped, vec![ReviewNode::TestCoverage]);
    assert_eq!(state.text(ReviewField::TestCoverageFeedback), TEST_COVERAGE_SKIP);
}

#[tokio::test]
async fn test_branch_results_independent_of_concurrency() {
    let graph = PipelineGraph::full_review().unwrap();

    let mut sequential = ReviewState::for_diff(COMPOSE_DIFF).unwrap();
    executor(Arc::new(ScriptedGenerator::default()), 1)
        .run(&graph, &mut sequential)
        .await
        .unwrap();

    let mut concurrent = ReviewState::for_diff(COMPOSE_DIFF).unwrap();
    executor(Arc::new(ScriptedGenerator::default()), 8)
        .run(&graph, &mut concurrent)
        .await
        .unwrap();

    assert_eq!(sequential, concurrent);
}

#[tokio::test]
async fn test_branch_matches_solo_run() {
    let mut full = ReviewState::for_diff(COMPOSE_DIFF).unwrap();
    executor(Arc::new(ScriptedGenerator::default()), 8)
        .run(&PipelineGraph::full_review().unwrap(), &mut full)
        .await
        .unwrap();

    for branch in [ReviewNode::Security, ReviewNode::Architecture] {
        let mut solo = ReviewState::for_diff(COMPOSE_DIFF).unwrap();
        executor(Arc::new(ScriptedGenerator::default()), 1)
            .run(&PipelineGraph::review(&[branch]).unwrap(), &mut solo)
            .await
            .unwrap();

        assert_eq!(
            solo.text(ReviewField::Suggestions),
            full.text(ReviewField::Suggestions)
        );
        assert_eq!(solo.text(branch.field()), full.text(branch.field()));
        assert_eq!(solo.text(branch.field()), format!("{branch} says hi"));
    }
}

#[tokio::test]
async fn test_critique_failure_aborts_after_summary() {
    let generator = Arc::new(ScriptedGenerator::failing(
        ReviewNode::Critique,
        "connection refused",
    ));
    let graph = PipelineGraph::full_review().unwrap();
    let mut state = ReviewState::for_diff(README_DIFF).unwrap();

    let err = executor(Arc::clone(&generator), 4)
        .run(&graph, &mut state)
        .await
        .unwrap_err();

    match &err {
        ReviewError::GenerationFailure { node, message } => {
            assert_eq!(*node, ReviewNode::Critique);
            assert!(message.contains("connection refused"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.node(), Some(ReviewNode::Critique));

    assert!(state.is_set(ReviewField::Summary));
    assert!(!state.is_set(ReviewField::Critique));
    assert!(!state.is_set(ReviewField::Suggestions));
    for node in ReviewNode::BRANCHES {
        assert!(!state.is_set(node.field()), "{node} should not have run");
    }
    assert_eq!(
        generator.calls(),
        vec![ReviewNode::Summarize, ReviewNode::Critique]
    );
}

#[tokio::test]
async fn test_branch_failure_keeps_sibling_results() {
    let generator = Arc::new(ScriptedGenerator::failing(
        ReviewNode::Performance,
        "model crashed",
    ));
    let graph = PipelineGraph::full_review().unwrap();
    let mut state = ReviewState::for_diff(README_DIFF).unwrap();

    let err = executor(generator, 4)
        .run(&graph, &mut state)
        .await
        .unwrap_err();

    assert_eq!(err.node(), Some(ReviewNode::Performance));
    assert!(state.is_set(ReviewField::Suggestions));
    assert!(state.is_set(ReviewField::SecurityFeedback));
    assert!(!state.is_set(ReviewField::PerformanceFeedback));
}

#[tokio::test]
async fn test_stalled_node_times_out() {
    let generator = Arc::new(ScriptedGenerator::stalling(ReviewNode::Summarize));
    let graph = PipelineGraph::full_review().unwrap();
    let executor = PipelineExecutor::new(
        generator,
        ExecutorConfig::default().with_node_timeout(Duration::from_millis(50)),
    );

    let err = executor.review(&graph, README_DIFF).await.unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(err.node(), Some(ReviewNode::Summarize));
}
