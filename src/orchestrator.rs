// ABOUTME: Deployment orchestrator: composes the stage runner and poller into
// ABOUTME: the promotion pipeline, with guaranteed cleanup and a single report.

use async_trait::async_trait;

use crate::config::PipelineConfig;
use crate::diagnostics::Warning;
use crate::output::Output;
use crate::pipeline::{
    ImageTags, Outcome, PipelineContext, PollOutcome, PollResult, Stage, StageError, StageFailure,
    poll, run_stages,
};
use crate::tools::Toolset;
use crate::types::BuildId;

/// Drives one pipeline run: Build → Publish → Configure → Deploy → Expose →
/// Verify, then unconditional cleanup, then exactly one final report.
pub struct Orchestrator {
    config: PipelineConfig,
    tools: Toolset,
}

impl Orchestrator {
    pub fn new(config: PipelineConfig, tools: Toolset) -> Self {
        Self { config, tools }
    }

    /// Run the pipeline to completion and return the final outcome.
    ///
    /// Cleanup runs exactly once on every exit path: normal completion, a
    /// fatal stage failure, or an external shutdown signal interrupting the
    /// stage sequence.
    pub async fn run(&self, build_id: BuildId, output: &mut Output) -> Outcome {
        output.start_timer();
        let mut cx = PipelineContext::new(build_id);

        output.progress(&format!(
            "Promoting {} build {} to cluster {}",
            self.config.app,
            cx.build_id(),
            self.config.cluster
        ));

        let stages = self.stages();
        let result = tokio::select! {
            result = run_stages(&stages, &mut cx, output) => result,
            _ = tokio::signal::ctrl_c() => Err(StageFailure {
                stage: "shutdown",
                reason: StageError::Interrupted,
            }),
        };
        // An interrupted sequence never reached its own transition.
        if result.is_err() {
            cx.finish(Outcome::Failed);
        }

        self.cleanup(&mut cx).await;

        for warning in cx.diagnostics().warnings() {
            output.warning(&warning.message);
        }

        match &result {
            Ok(()) => output.report_success(cx.endpoint().unwrap_or("unknown")),
            Err(failure) => output.report_failure(failure.stage, &failure.reason.to_string()),
        }

        cx.outcome()
    }

    /// The concrete stage sequence for one run.
    pub fn stages(&self) -> Vec<Box<dyn Stage>> {
        vec![
            Box::new(BuildStage::new(self)),
            Box::new(PublishStage::new(self)),
            Box::new(ConfigureStage::new(self)),
            Box::new(DeployStage::new(self)),
            Box::new(ExposeStage::new(self)),
            Box::new(VerifyStage::new(self)),
        ]
    }

    /// Best-effort removal of the two locally-produced image tags.
    ///
    /// Idempotent: removal failures (image absent, already removed) become
    /// cleanup warnings and never mask the run's real outcome.
    pub async fn cleanup(&self, cx: &mut PipelineContext) {
        let Some(tags) = cx.images().cloned() else {
            tracing::debug!("no locally-built image tags to remove");
            return;
        };

        for tag in [tags.versioned, tags.latest] {
            if let Err(e) = self.tools.images.remove(&tag).await {
                cx.diagnostics_mut()
                    .warn(Warning::cleanup(format!("failed to remove image {tag}: {e}")));
            }
        }
    }
}

struct BuildStage {
    tools: Toolset,
    config: PipelineConfig,
}

impl BuildStage {
    fn new(orchestrator: &Orchestrator) -> Self {
        Self {
            tools: orchestrator.tools.clone(),
            config: orchestrator.config.clone(),
        }
    }
}

#[async_trait]
impl Stage for BuildStage {
    fn name(&self) -> &'static str {
        "Build"
    }

    async fn run(&self, cx: &mut PipelineContext) -> Result<(), StageError> {
        let versioned = self.config.repository.image(cx.build_id().as_str());
        let latest = self.config.repository.image("latest");

        self.tools
            .images
            .build(&self.config.build_context, &versioned)
            .await?;
        self.tools.images.tag(&versioned, &latest).await?;

        cx.set_images(ImageTags { versioned, latest });
        Ok(())
    }
}

struct PublishStage {
    tools: Toolset,
    config: PipelineConfig,
}

impl PublishStage {
    fn new(orchestrator: &Orchestrator) -> Self {
        Self {
            tools: orchestrator.tools.clone(),
            config: orchestrator.config.clone(),
        }
    }
}

#[async_trait]
impl Stage for PublishStage {
    fn name(&self) -> &'static str {
        "Publish"
    }

    async fn run(&self, cx: &mut PipelineContext) -> Result<(), StageError> {
        let tags = cx.images().cloned().ok_or(StageError::MissingImages)?;

        self.tools
            .images
            .login(self.config.repository.registry_host())
            .await?;
        // No partial-push retry: an exit-code failure propagates immediately.
        self.tools.images.push(&tags.versioned).await?;
        self.tools.images.push(&tags.latest).await?;
        Ok(())
    }
}

struct ConfigureStage {
    tools: Toolset,
    config: PipelineConfig,
}

impl ConfigureStage {
    fn new(orchestrator: &Orchestrator) -> Self {
        Self {
            tools: orchestrator.tools.clone(),
            config: orchestrator.config.clone(),
        }
    }
}

#[async_trait]
impl Stage for ConfigureStage {
    fn name(&self) -> &'static str {
        "Configure"
    }

    async fn run(&self, _cx: &mut PipelineContext) -> Result<(), StageError> {
        self.tools.cluster.set_region(&self.config.region).await?;
        self.tools
            .cluster
            .bind_cluster(&self.config.cluster, &self.config.region)
            .await?;
        Ok(())
    }
}

struct DeployStage {
    tools: Toolset,
    config: PipelineConfig,
}

impl DeployStage {
    fn new(orchestrator: &Orchestrator) -> Self {
        Self {
            tools: orchestrator.tools.clone(),
            config: orchestrator.config.clone(),
        }
    }
}

#[async_trait]
impl Stage for DeployStage {
    fn name(&self) -> &'static str {
        "Deploy"
    }

    async fn run(&self, cx: &mut PipelineContext) -> Result<(), StageError> {
        let versioned = cx
            .images()
            .map(|tags| tags.versioned.clone())
            .ok_or(StageError::MissingImages)?;

        // Always pin the versioned tag, never "latest", so rollouts stay
        // reproducible.
        self.tools
            .workloads
            .apply_with_image(
                &self.config.manifests.deployment,
                &self.config.image_token,
                &versioned,
            )
            .await?;
        self.tools
            .workloads
            .apply(&self.config.manifests.service)
            .await?;
        self.tools
            .workloads
            .wait_rollout(&self.config.app, self.config.rollout_timeout)
            .await?;

        let instances = self.tools.workloads.list_instances(&self.config.app).await?;
        if !instances.trim().is_empty() {
            tracing::info!(app = %self.config.app, "running instances:\n{}", instances.trim_end());
        }
        Ok(())
    }
}

struct ExposeStage {
    tools: Toolset,
    config: PipelineConfig,
}

impl ExposeStage {
    fn new(orchestrator: &Orchestrator) -> Self {
        Self {
            tools: orchestrator.tools.clone(),
            config: orchestrator.config.clone(),
        }
    }
}

#[async_trait]
impl Stage for ExposeStage {
    fn name(&self) -> &'static str {
        "Expose"
    }

    async fn run(&self, _cx: &mut PipelineContext) -> Result<(), StageError> {
        self.tools
            .routing
            .apply(&self.config.manifests.ingress)
            .await?;

        // Give the routing controller time to register the resource before
        // the first read. A tunable heuristic, not a controller contract.
        tokio::time::sleep(self.config.endpoint.settle_delay).await;
        Ok(())
    }
}

struct VerifyStage {
    tools: Toolset,
    config: PipelineConfig,
}

impl VerifyStage {
    fn new(orchestrator: &Orchestrator) -> Self {
        Self {
            tools: orchestrator.tools.clone(),
            config: orchestrator.config.clone(),
        }
    }

    async fn smoke_check(&self, cx: &mut PipelineContext, endpoint: &str) {
        for path in &self.config.smoke_paths {
            let url = format!("http://{endpoint}{path}");
            match self.tools.probes.head(&url).await {
                Ok(status) if status < 400 => {
                    tracing::info!(%url, status, "smoke check passed");
                }
                Ok(status) => {
                    cx.diagnostics_mut().warn(Warning::smoke_check(format!(
                        "HEAD {url} returned status {status}"
                    )));
                }
                Err(e) => {
                    cx.diagnostics_mut()
                        .warn(Warning::smoke_check(format!("HEAD {url} failed: {e}")));
                }
            }
        }
    }
}

#[async_trait]
impl Stage for VerifyStage {
    fn name(&self) -> &'static str {
        "Verify"
    }

    async fn run(&self, cx: &mut PipelineContext) -> Result<(), StageError> {
        let routing = self.tools.routing.clone();
        let app = self.config.app.clone();
        let controller: Option<(String, String)> = self
            .config
            .controller_service_parts()
            .map(|(ns, name)| (ns.to_string(), name.to_string()));

        let probe = || {
            let routing = routing.clone();
            let app = app.clone();
            let controller = controller.clone();
            async move {
                match routing.ingress_hostname(&app).await {
                    Ok(Some(hostname)) => return PollResult::Ready(hostname),
                    Ok(None) => {}
                    Err(e) => return PollResult::Error(e.to_string()),
                }
                if let Some((namespace, service)) = &controller {
                    match routing.controller_hostname(namespace, service).await {
                        Ok(Some(hostname)) => return PollResult::Ready(hostname),
                        Ok(None) => {}
                        Err(e) => return PollResult::Error(e.to_string()),
                    }
                }
                PollResult::NotYetReady
            }
        };

        let endpoint = match poll(
            probe,
            self.config.endpoint.interval,
            self.config.endpoint.deadline,
        )
        .await
        {
            PollOutcome::Success(hostname) => hostname,
            PollOutcome::TimedOut => {
                return Err(StageError::EndpointTimeout {
                    waited: self.config.endpoint.deadline,
                });
            }
        };

        tracing::info!(%endpoint, "endpoint provisioned");
        cx.set_endpoint(&endpoint);

        // Best-effort reachability probes; failures never gate the run.
        self.smoke_check(cx, &endpoint).await;
        Ok(())
    }
}
