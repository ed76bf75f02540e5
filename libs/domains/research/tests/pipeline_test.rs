use domain_research::{PipelineComponent, PipelineError, ResearchPipeline};

#[test]
fn test_load_existing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = ResearchPipeline::load(dir.path()).unwrap();

    assert_eq!(pipeline.root(), dir.path().canonicalize().unwrap());

    let imputer = pipeline.component(PipelineComponent::FeatureImputer);
    assert_eq!(imputer.name, "FeatureImputer");
    assert_eq!(imputer.root, pipeline.root());
}

#[test]
fn test_exports_exactly_four_components() {
    assert_eq!(
        ResearchPipeline::exports(),
        ["FeatureImputer", "EDA", "DataLoader", "FeatureSelection"]
    );

    let dir = tempfile::tempdir().unwrap();
    let pipeline = ResearchPipeline::load(dir.path()).unwrap();
    let names: Vec<_> = pipeline.components().map(|c| c.name).collect();
    assert_eq!(names, ResearchPipeline::exports());
}

#[test]
fn test_missing_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("research_pipeline");

    let err = ResearchPipeline::load(&missing).unwrap_err();
    assert!(matches!(err, PipelineError::NotFound(ref p) if *p == missing));
    assert!(err.to_string().contains("RESEARCH_PIPELINE_PATH"));
}

#[test]
fn test_file_is_not_a_pipeline() {
    let file = tempfile::NamedTempFile::new().unwrap();

    let err = ResearchPipeline::load(file.path()).unwrap_err();
    assert!(matches!(err, PipelineError::NotADirectory(_)));
}
