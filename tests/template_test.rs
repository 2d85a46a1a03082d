use consul_sidecar::core::process::{CommandLine, Properties, USER_NAME};
use consul_sidecar::IdentityTemplateResolver;

#[test]
fn test_env_placeholders_from_process_environment() {
    std::env::set_var("SIDECAR_TEMPLATE_TEST_DC", "eu-west");
    std::env::remove_var("SIDECAR_TEMPLATE_TEST_UNSET");

    let resolver = IdentityTemplateResolver::from_process(Properties::new(), CommandLine::default());

    assert_eq!(
        resolver.expand(r#"dc_$ENV("SIDECAR_TEMPLATE_TEST_DC")_$ENV("SIDECAR_TEMPLATE_TEST_DC")"#),
        "dc_eu-west_eu-west"
    );
    assert_eq!(
        resolver.expand(r#"dc_$ENV("SIDECAR_TEMPLATE_TEST_UNSET")"#),
        r#"dc_$ENV("SIDECAR_TEMPLATE_TEST_UNSET")"#
    );

    std::env::remove_var("SIDECAR_TEMPLATE_TEST_DC");
}

#[test]
fn test_full_tag_set_for_hadoop_task() {
    let command_line = CommandLine::parse(
        "org.apache.hadoop.mapred.YarnChild 10.0.0.7 41234 attempt_1410450250506_0003_m_000000_0 2",
    );
    let properties = Properties::new()
        .with(USER_NAME, "hadoop")
        .with("queue", "batch");

    let resolver = IdentityTemplateResolver::from_process(properties, command_line);
    let tags = resolver.resolve_tags(&[
        "$CLASSNAME".to_string(),
        r#"queue_$SYSTEM_PROPERTY("queue")"#.to_string(),
        "host_$ARG(1)".to_string(),
        "missing_$ARG(9)".to_string(),
    ]);

    assert_eq!(
        tags,
        vec![
            "YarnChild",
            "queue_batch",
            "host_10.0.0.7",
            "missing_$ARG(9)",
            "job_1410450250506_0003",
            "user_hadoop",
        ]
    );
}
