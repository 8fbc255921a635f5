//! Install the chart into an ephemeral kind cluster

use std::time::Duration;

use airbyte_chart_tests::{base_helm_options, init_tracing};
use chartcheck_core::{DEFAULT_RELEASE, HarnessConfig};
use chartcheck_helm::{HelmRenderer, InstallOptions};
use chartcheck_kube::{ClusterOptions, KindCluster};
use k8s_openapi::api::apps::v1::Deployment;
use kube::Api;

const NAMESPACE: &str = "airbyte-chart-tests";

#[test]
#[ignore = "requires docker, kind, helm and the Airbyte chart (HELM_CHART_PATH)"]
fn test_install_community_edition() {
    init_tracing();
    let config = HarnessConfig::from_env().expect("HELM_CHART_PATH should point at the chart");
    config.validate().expect("chart should exist");

    let options = ClusterOptions::from_config(ClusterOptions::unique("airbyte").name, &config);
    let cluster = KindCluster::create(&options).expect("kind cluster should start");

    let helm = HelmRenderer::from_config(&config);
    let install = InstallOptions::new(DEFAULT_RELEASE, NAMESPACE, cluster.kubeconfig_path())
        .with_wait(Duration::from_secs(900));
    helm.install(&config.chart_path, &install, &base_helm_options())
        .expect("helm install should succeed");

    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    runtime.block_on(async {
        assert!(cluster.ready_nodes().await.expect("list nodes") >= 1);

        let client = cluster.client().await.expect("cluster client");
        let deployments: Api<Deployment> = Api::namespaced(client, NAMESPACE);
        let server = deployments
            .get("airbyte-server")
            .await
            .expect("airbyte-server should be deployed");

        let ready = server
            .status
            .and_then(|s| s.ready_replicas)
            .unwrap_or_default();
        assert!(ready >= 1, "airbyte-server has no ready replicas");
    });

    helm.uninstall(&install).expect("helm uninstall should succeed");
}
