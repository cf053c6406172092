use std::sync::Arc;
use tokio::sync::mpsc;
use log::{debug, trace, error, info};
use crate::GeneratorFoot;

/// Everything a submission needs, shared read-only by all in-flight
/// submissions
pub struct BackendState
{   pub pipeline: crate::pipeline::GenerationPipeline
  , pub sink: Arc<dyn crate::sink::ResultSink>
  , pub notifier: Arc<dyn crate::sink::NotificationChannel>
  , pub retry: Option<crate::retry::RetryPolicy>
}

impl BackendState
{   pub fn new(
      pipeline: crate::pipeline::GenerationPipeline
    , sink: Arc<dyn crate::sink::ResultSink>
    , notifier: Arc<dyn crate::sink::NotificationChannel>
    ) -> Self
    {   debug!("Initializing BackendState");
        let retry = crate::retry::RetryPolicy::from_config(
          &pipeline.config().retry
        );
        BackendState
        {   pipeline
          , sink
          , notifier
          , retry
        }
    }

    /// Override the retry policy taken from configuration
    pub fn with_retry(
      mut self
    , retry: Option<crate::retry::RetryPolicy>
    ) -> Self
    {   self.retry = retry;
        self
    }

    async fn generate(
      &self
    , kind: crate::ContentKind
    , options: &crate::template::OptionSet
    , intent: &str
    ) -> crate::GenerationResult
    {   match &self.retry
        {   Some(policy) => {
              crate::retry::generate_with_retry(
                &self.pipeline, policy, kind, options, intent
              ).await
            }
          , None => {
              self.pipeline.generate(kind, options, intent).await
            }
        }
    }
}

/// Public API for the generation backend - owns the task
///
/// Every submission runs in its own task, so submissions never wait on
/// each other. Dropping the receiver returned by `submit` abandons the
/// submission: an in-flight request is cancelled and a late result is
/// discarded without reaching the sink or the notifier.
pub struct GenerationBackend
{   hand: crate::GeneratorHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl GenerationBackend
{   /// Create and spawn a new backend
    /// Returns immediately - spawns background task
    pub fn new(state: BackendState) -> Self
    {   debug!("Creating GenerationBackend with task ownership");

        let (submit_tx, submit_rx)
          = mpsc::unbounded_channel();
        let (kill_process_tx, kill_process_rx)
          = mpsc::unbounded_channel();

        let hand = crate::GeneratorHand
        {   submit_tx
          , kill_process_tx
        };

        let foot = crate::GeneratorFoot
        {   submit_rx
          , kill_process_rx
        };

        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, Arc::new(state)).await
        });

        GenerationBackend
        {   hand
          , _task_handle
        }
    }

    /// Queue a submission - returns almost immediately.
    /// Keep the receiver alive for as long as the result is wanted.
    pub async fn submit(
      &self
    , kind: crate::ContentKind
    , options: crate::template::OptionSet
    , intent: String
    ) -> Result<
        mpsc::UnboundedReceiver<crate::GenerationResult>,
        crate::error::Error
      >
    {   debug!("submit queuing {:?}", kind);
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::SubmitArgs
        {   kind
          , options
          , intent
          , reply: reply_tx
        };

        self.hand.submit_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::BackendClosed
          })?;

        Ok(reply_rx)
    }

    /// Submit and wait for the result
    pub async fn generate(
      &self
    , kind: crate::ContentKind
    , options: crate::template::OptionSet
    , intent: String
    ) -> crate::GenerationResult
    {   let mut rx = self.submit(kind, options, intent).await?;
        match rx.recv().await
        {   Some(result) => result
          , None => {
              error!("Backend dropped submission");
              Err(crate::error::Error::BackendClosed)
            }
        }
    }

    /// Gracefully shutdown the backend.
    /// Waits for submissions already running to finish delivering.
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down GenerationBackend");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::KillProcessArgs
        {   reply: reply_tx
        };

        self.hand.kill_process_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel already closed");
            crate::error::Error::BackendClosed
          })?;

        // Wait for shutdown confirmation
        if let Some(result) = reply_rx.recv().await
        {   debug!("Backend shutdown confirmed");
            result
        } else
        {   error!("Backend exited without confirming shutdown");
            Err(crate::error::Error::BackendClosed)
        }
    }
}

/// Main backend event loop
///
/// tokio::select! is ONLY for fast queueing: each submission is
/// spawned onto its own task and the loop goes straight back to
/// listening. Finished tasks are reaped as they complete.
async fn run_backend_loop(
  foot: crate::GeneratorFoot
, state: Arc<BackendState>
)
{   debug!("Starting GenerationBackend event loop");
    let GeneratorFoot
    {   mut submit_rx
      , mut kill_process_rx
    } = foot;
    let mut in_flight = tokio::task::JoinSet::new();

    loop
    { tokio::select!
      { // submissions queued ahead of a kill are still honored
        biased;

        Some(cmd) = submit_rx.recv() => {
          debug!("Received Submit for {:?}", cmd.kind);
          in_flight.spawn(run_submission(state.clone(), cmd));
        }
      , Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
          if let Err(e) = joined
          {   error!("Submission task failed: {}", e);
          }
        }
      , Some(cmd) = kill_process_rx.recv() => {
          debug!("Received KillProcess with {} in flight", in_flight.len());
          while let Some(joined) = in_flight.join_next().await
          {   if let Err(e) = joined
              {   error!("Submission task failed: {}", e);
              }
          }
          let _ = cmd.reply.send(Ok(()));
          info!("GenerationBackend shutting down");
          break;
        }
      , else => {
          debug!("All backend channels closed");
          break;
        }
      }
    }
}

/// One submission, start to finish
async fn run_submission(
  state: Arc<BackendState>
, cmd: crate::SubmitArgs
)
{   let crate::SubmitArgs
    {   kind
      , options
      , intent
      , reply
    } = cmd;

    let result = tokio::select!
    { _ = reply.closed() => {
        debug!("{:?} submission abandoned while in flight", kind);
        return;
      }
    , result = state.generate(kind, &options, &intent) => result
    };

    // the reply is the commit point: once it lands the caller still
    // holds the receiver, so the result may reach the sink
    if reply.send(result.clone()).is_err()
    {   debug!("Discarding late {:?} result", kind);
        return;
    }

    trace!("Delivering {:?} result", kind);
    crate::sink::deliver(
      &result
    , state.sink.as_ref()
    , state.notifier.as_ref()
    );
}
