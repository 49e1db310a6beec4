use mindroute_graph::{ConversationState, Graph, Message};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Line typed to end the session
pub const EXIT_SENTINEL: &str = "exit";

/// Interactive loop: one line in, one graph invocation, one reply out.
///
/// The session owns the conversation state across turns. A turn works on a
/// copy, so a failed invocation leaves the retained history untouched.
pub struct Session {
    graph: Graph,
    state: ConversationState,
    prompt: String,
    farewell: String,
}

impl Session {
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            state: ConversationState::new(),
            prompt: "Enter Message: ".to_string(),
            farewell: "Bye".to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_farewell(mut self, farewell: impl Into<String>) -> Self {
        self.farewell = farewell.into();
        self
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Append `input` as a user message and run the graph once.
    ///
    /// On success the returned state replaces the retained one.
    pub async fn turn(&mut self, input: &str) -> mindroute_graph::Result<&Message> {
        let pending = self.state.clone().append(Message::human(input));
        let state = self.graph.invoke(pending).await?;
        self.state = state;

        self.state
            .last_message()
            .ok_or(mindroute_graph::GraphError::EmptyHistory)
    }

    /// Drive the session until `exit` or end of input
    pub async fn run<R, W>(&mut self, mut input: R, mut output: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            output.write_all(self.prompt.as_bytes()).await?;
            output.flush().await?;

            line.clear();
            if input.read_line(&mut line).await? == 0 {
                tracing::info!("End of input, closing session");
                break;
            }

            let text = strip_line_terminator(&line);
            if text == EXIT_SENTINEL {
                break;
            }

            tracing::info!(turn = self.state.messages().len() / 2 + 1, "Starting turn");

            let reply = match self.turn(text).await {
                Ok(message) => format!("Assistant: {}\n", message.content()),
                Err(e) => {
                    tracing::warn!(error = %e, "Turn failed, history kept as before");
                    format!("Error: turn did not complete: {}\n", e)
                }
            };
            output.write_all(reply.as_bytes()).await?;
        }

        output.write_all(format!("{}\n", self.farewell).as_bytes()).await?;
        output.flush().await?;
        Ok(())
    }
}

fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
