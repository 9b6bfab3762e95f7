//! End-to-end tests for deploy operations against a scripted control plane.

#[cfg(test)]
mod tests {
    use crate::client::{EventPage, ParameterDeclaration, StackDescription};
    use crate::config::DeployerConfig;
    use crate::core::PollOutcome;
    use crate::deployer::{DeploySpec, StackDeployer};
    use crate::errors::{ControlPlaneError, StackpilotError, TemplateResolutionError};
    use crate::events::CollectingProgressSink;
    use crate::parameters::Parameter;
    use crate::request::StackOptions;
    use crate::template::{TemplateReference, TemplateSource};
    use crate::testing::{
        fixed_start, resource_event, seconds_after_start, stack_event, ScriptedControlPlane,
        StaticIdentity,
    };
    use crate::utils::ManualClock;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    struct Harness {
        control_plane: Arc<ScriptedControlPlane>,
        sink: Arc<CollectingProgressSink>,
        deployer: StackDeployer,
    }

    fn harness_with(config: DeployerConfig) -> Harness {
        let control_plane = Arc::new(ScriptedControlPlane::new());
        let sink = Arc::new(CollectingProgressSink::new());
        let deployer = StackDeployer::new(control_plane.clone(), config)
            .unwrap()
            .with_sink(sink.clone())
            .with_clock(Arc::new(ManualClock::new(fixed_start())));
        Harness {
            control_plane,
            sink,
            deployer,
        }
    }

    fn harness() -> Harness {
        harness_with(DeployerConfig::new().with_poll_interval(Duration::from_millis(1)))
    }

    fn template() -> TemplateReference {
        TemplateReference::inline(json!({
            "Parameters": {"ImageId": {"Type": "String"}, "VpcId": {"Type": "String"}},
            "Resources": {}
        }))
    }

    fn demo_spec() -> DeploySpec {
        DeploySpec::new("demo", template()).with_parameters(json!({"imageid": "ami-9"}))
    }

    fn create_complete_pages(cp: &ScriptedControlPlane) {
        let started = stack_event("1", "demo", "CREATE_IN_PROGRESS", seconds_after_start(1))
            .with_reason("User Initiated");
        cp.push_page(EventPage::last(vec![started.clone()]));
        cp.push_page(EventPage::last(vec![
            stack_event("3", "demo", "CREATE_COMPLETE", seconds_after_start(40)),
            resource_event("2", "AWS::S3::Bucket", "Bucket", "CREATE_COMPLETE", seconds_after_start(30)),
            started,
        ]));
    }

    async fn run<F: std::future::Future>(future: F) -> F::Output {
        tokio::time::timeout(Duration::from_secs(5), future)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_deploy_creates_missing_stack() {
        let h = harness();
        h.control_plane.set_parameters(vec![
            ParameterDeclaration::required("ImageId"),
            ParameterDeclaration::with_default("VpcId", "vpc-1"),
        ]);
        create_complete_pages(&h.control_plane);

        let outcome = run(h.deployer.deploy(&demo_spec())).await.unwrap();

        assert_eq!(outcome, PollOutcome::Success);
        assert_eq!(h.sink.event_ids(), vec!["1", "2", "3"]);

        let submitted = h.control_plane.submitted();
        assert_eq!(submitted.len(), 1);
        let request = &submitted[0];
        assert_eq!(request.stack_name, "demo");
        assert_eq!(request.capabilities, vec!["CAPABILITY_IAM", "CAPABILITY_NAMED_IAM"]);
        assert_eq!(
            request.parameters,
            vec![
                Parameter::new("ImageId", Some("ami-9".to_string())),
                Parameter::new("VpcId", Some("vpc-1".to_string())),
            ]
        );
        assert!(request.role_arn.is_none());
        assert!(matches!(request.template, TemplateSource::Body(_)));
    }

    #[tokio::test]
    async fn test_deploy_updates_existing_stack() {
        let h = harness();
        h.control_plane
            .set_description(Some(StackDescription::new("demo", "CREATE_COMPLETE")));
        h.control_plane.push_page(EventPage::last(vec![
            stack_event("2", "demo", "UPDATE_COMPLETE", seconds_after_start(10)),
            stack_event("1", "demo", "UPDATE_IN_PROGRESS", seconds_after_start(1)),
            stack_event("0", "demo", "CREATE_COMPLETE", seconds_after_start(-600)),
        ]));

        let outcome = run(h.deployer.deploy(&demo_spec())).await.unwrap();

        assert_eq!(outcome, PollOutcome::Success);
        assert_eq!(h.sink.event_ids(), vec!["1", "2"]);
        assert_eq!(h.control_plane.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_update_rollback_is_failure() {
        let h = harness();
        h.control_plane.push_page(EventPage::last(vec![
            stack_event("2", "demo", "UPDATE_ROLLBACK_COMPLETE", seconds_after_start(20)),
            resource_event(
                "1",
                "AWS::S3::Bucket",
                "Bucket",
                "UPDATE_FAILED",
                seconds_after_start(10),
            )
            .with_reason("Bucket already exists"),
        ]));

        let outcome = run(h.deployer.update(&demo_spec())).await.unwrap();

        assert_eq!(outcome, PollOutcome::Failure("demo UPDATE Failed".to_string()));
        assert_eq!(h.sink.len(), 2);
    }

    #[tokio::test]
    async fn test_update_without_changes_succeeds_without_polling() {
        let h = harness();
        h.control_plane
            .set_update_result(Err(ControlPlaneError::NoUpdates));

        let outcome = run(h.deployer.update(&demo_spec())).await.unwrap();

        assert_eq!(outcome, PollOutcome::Success);
        assert_eq!(h.control_plane.event_call_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_create_is_submission_error() {
        let h = harness();
        h.control_plane
            .set_create_result(Err(ControlPlaneError::Validation("Template format error".to_string())));

        let err = run(h.deployer.create(&demo_spec())).await.unwrap_err();

        assert!(matches!(err, StackpilotError::Submission { ref stack, .. } if stack == "demo"));
        assert_eq!(h.control_plane.event_call_count(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_template_aborts_before_submission() {
        let h = harness();
        let spec = DeploySpec::new("demo", TemplateReference::Path("/no/such/template.yaml".into()));

        let err = run(h.deployer.create(&spec)).await.unwrap_err();

        assert!(matches!(
            err,
            StackpilotError::TemplateResolution(TemplateResolutionError::Read { .. })
        ));
        assert!(h.control_plane.submitted().is_empty());
        assert!(h.control_plane.templates().is_empty());
    }

    #[tokio::test]
    async fn test_schema_failure_aborts_before_submission() {
        let h = harness();
        h.control_plane
            .set_parameters_error(ControlPlaneError::transport("access denied"));

        let err = run(h.deployer.create(&demo_spec())).await.unwrap_err();

        assert!(matches!(err, StackpilotError::ParameterSchema(_)));
        assert!(h.control_plane.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_delete_waits_until_stack_is_gone() {
        let h = harness();
        h.control_plane.push_page(EventPage::last(vec![stack_event(
            "1",
            "demo",
            "DELETE_IN_PROGRESS",
            seconds_after_start(1),
        )]));
        h.control_plane
            .push_event_error(ControlPlaneError::not_found("demo"));

        let outcome = run(h.deployer.delete("demo")).await.unwrap();

        assert_eq!(outcome, PollOutcome::Success);
        assert_eq!(h.control_plane.deleted(), vec!["demo"]);
        assert_eq!(h.sink.event_ids(), vec!["1"]);
    }

    #[tokio::test]
    async fn test_delete_of_missing_stack_succeeds() {
        let h = harness();
        h.control_plane
            .set_delete_result(Err(ControlPlaneError::not_found("demo")));

        let outcome = run(h.deployer.delete("demo")).await.unwrap();

        assert_eq!(outcome, PollOutcome::Success);
        assert_eq!(h.control_plane.event_call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_wait_returns_after_submission() {
        let h = harness_with(DeployerConfig::new().with_no_wait(true));

        let outcome = run(h.deployer.create(&demo_spec())).await.unwrap();

        assert_eq!(outcome, PollOutcome::Success);
        assert_eq!(h.control_plane.submitted().len(), 1);
        assert_eq!(h.control_plane.event_call_count(), 0);
    }

    #[tokio::test]
    async fn test_role_name_resolved_through_identity() {
        let h = harness_with(
            DeployerConfig::new()
                .with_no_wait(true)
                .with_role_name("deployer"),
        );
        let deployer = h.deployer.with_identity(Arc::new(StaticIdentity::new("123456789012")));

        run(deployer.create(&demo_spec())).await.unwrap();

        let request = &h.control_plane.submitted()[0];
        assert_eq!(
            request.role_arn.as_deref(),
            Some("arn:aws:iam::123456789012:role/deployer")
        );
    }

    #[tokio::test]
    async fn test_spec_options_override_config() {
        let h = harness_with(DeployerConfig::new().with_no_wait(true));
        let spec = demo_spec().with_options(
            StackOptions::new()
                .with_capabilities(["CAPABILITY_AUTO_EXPAND"])
                .with_tag("team", "infra"),
        );

        run(h.deployer.create(&spec)).await.unwrap();

        let request = &h.control_plane.submitted()[0];
        assert_eq!(request.capabilities, vec!["CAPABILITY_AUTO_EXPAND"]);
        assert_eq!(request.tags.len(), 1);
        assert_eq!(request.tags[0].key, "team");
    }

    #[tokio::test]
    async fn test_stack_exists_statuses() {
        let h = harness();
        assert!(!h.deployer.stack_exists("demo").await);

        h.control_plane
            .set_description(Some(StackDescription::new("demo", "UPDATE_ROLLBACK_COMPLETE")));
        assert!(h.deployer.stack_exists("demo").await);

        h.control_plane
            .set_description(Some(StackDescription::new("demo", "CREATE_IN_PROGRESS")));
        assert!(!h.deployer.stack_exists("demo").await);
    }

    #[tokio::test]
    async fn test_outputs() {
        let h = harness();
        h.control_plane.set_description(Some(
            StackDescription::new("demo", "CREATE_COMPLETE").with_output("BucketName", "demo-bucket"),
        ));

        assert_eq!(h.deployer.outputs("demo").await.unwrap().len(), 1);
        assert_eq!(h.deployer.output("demo", "BucketName").await.unwrap(), "demo-bucket");
        assert_eq!(h.deployer.output("demo", "Missing").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_outputs_of_missing_stack_is_error() {
        let h = harness();
        let err = h.deployer.outputs("demo").await.unwrap_err();
        assert!(matches!(err, StackpilotError::ControlPlane(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_validate_resolves_template() {
        let h = harness();
        h.control_plane
            .set_validation(Ok(json!({"Parameters": [{"ParameterKey": "ImageId"}]})));

        let summary = h
            .deployer
            .validate(&h.deployer.template_reference("{\"Resources\": {}}"), &Default::default())
            .await
            .unwrap();

        assert_eq!(summary["Parameters"][0]["ParameterKey"], "ImageId");
        assert_eq!(
            h.control_plane.templates(),
            vec![TemplateSource::Body("{\"Resources\": {}}".to_string())]
        );
    }

    #[tokio::test]
    async fn test_deploy_all_reports_each_result() {
        let h = harness_with(DeployerConfig::new().with_no_wait(true));
        let specs = vec![
            DeploySpec::new("first", template()),
            DeploySpec::new("broken", TemplateReference::Path("/no/such/file.json".into())),
            DeploySpec::new("second", template()),
        ];

        let results = run(h.deployer.deploy_all(&specs)).await;

        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], Ok(PollOutcome::Success)));
        assert!(results[1].is_err());
        assert!(matches!(results[2], Ok(PollOutcome::Success)));

        let mut names: Vec<String> = h
            .control_plane
            .submitted()
            .into_iter()
            .map(|r| r.stack_name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = DeployerConfig::new().with_poll_interval(Duration::ZERO);
        let result = StackDeployer::new(Arc::new(ScriptedControlPlane::new()), config);
        assert!(matches!(result, Err(StackpilotError::Configuration(_))));
    }
}
