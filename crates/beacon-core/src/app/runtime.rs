impl<IN, T> BeaconApp<IN, T>
where
    IN: ButtonSource,
    T: Transport,
{
    pub fn new(input: IN, transport: T, config: BeaconConfig) -> Self {
        Self {
            input,
            config,
            classifiers: [GestureClassifier::new(config.gesture); ButtonId::COUNT],
            sync: SyncEngine::new(transport, config.sync),
            presenter: ScrollPresenter::new(config.scroll),
            send_status: SendStatus::Idle,
            remote_unseen: false,
            cues: Deque::new(),
            online: None,
            pending_redraw: true,
            last_reconnect_slot: None,
        }
    }

    /// One loop iteration. Network calls are awaited inline.
    pub async fn tick(&mut self, now_ms: u64) -> TickResult {
        self.process_inputs(now_ms).await;
        self.resolve_gestures(now_ms).await;
        self.poll_inbox(now_ms).await;
        self.tick_display(now_ms)
    }

    async fn process_inputs(&mut self, now_ms: u64) {
        loop {
            let edge = match self.input.poll_edge(now_ms) {
                Ok(Some(edge)) => edge,
                Ok(None) => break,
                Err(_) => {
                    warn!("input: button source error");
                    break;
                }
            };

            let slot = edge.button.index();
            // Edges batched into one tick must not merge across an expired gap.
            if let Some(intent) = self.classifiers[slot].poll(edge.at_ms) {
                self.dispatch(edge.button, intent, now_ms).await;
            }

            if edge.kind == EdgeKind::Down {
                self.push_cue(Cue::Press);
            }
            if let Some(intent) = self.classifiers[slot].on_edge(edge.kind, edge.at_ms) {
                self.dispatch(edge.button, intent, now_ms).await;
            }
        }
    }

    async fn resolve_gestures(&mut self, now_ms: u64) {
        for button in ButtonId::ALL {
            if let Some(intent) = self.classifiers[button.index()].poll(now_ms) {
                self.dispatch(button, intent, now_ms).await;
            }
        }
    }

    async fn dispatch(&mut self, button: ButtonId, intent: GestureIntent, now_ms: u64) {
        let Some(text) = self.config.intents.text_for(button, intent) else {
            debug!("gesture: unbound button={:?} intent={:?}", button, intent);
            return;
        };

        info!(
            "gesture: button={:?} intent={:?} text={:?}",
            button, intent, text
        );
        let outcome = self.sync.send(text, now_ms).await;
        self.record_send(outcome);
    }

    fn record_send(&mut self, outcome: SendOutcome) {
        let status = match outcome {
            SendOutcome::Offline => return,
            SendOutcome::Delivered { status } => {
                self.push_cue(Cue::SendOk);
                SendStatus::Delivered(status)
            }
            SendOutcome::Rejected { status } => {
                self.push_cue(Cue::SendError);
                SendStatus::Rejected(status)
            }
            SendOutcome::Failed => {
                self.push_cue(Cue::SendError);
                SendStatus::Failed
            }
        };

        self.send_status = status;
        self.remote_unseen = false;
        self.pending_redraw = true;
    }

    async fn poll_inbox(&mut self, now_ms: u64) {
        if self.sync.poll(now_ms).await == PollOutcome::Updated {
            self.push_cue(Cue::Incoming);
            self.remote_unseen = true;
            self.send_status = SendStatus::Idle;
            self.pending_redraw = true;
        }
    }

    fn tick_display(&mut self, now_ms: u64) -> TickResult {
        let online = self.sync.is_online();
        if self.online != Some(online) {
            info!("app: link {}", if online { "up" } else { "down" });
            self.online = Some(online);
            self.pending_redraw = true;
            self.last_reconnect_slot = None;
        }

        if !online {
            let slot = now_ms / self.config.reconnect_frame_ms.max(1);
            if self.pending_redraw || self.last_reconnect_slot != Some(slot) {
                self.pending_redraw = false;
                self.last_reconnect_slot = Some(slot);
                return TickResult::RenderRequested;
            }
            return TickResult::NoRender;
        }

        let scrolled = self.presenter.tick(self.sync.state_mut(), now_ms);
        let requested = if core::mem::take(&mut self.pending_redraw) {
            TickResult::RenderRequested
        } else {
            TickResult::NoRender
        };
        scrolled.or(requested)
    }

    fn push_cue(&mut self, cue: Cue) {
        if self.cues.is_full() {
            let _ = self.cues.pop_front();
        }
        let _ = self.cues.push_back(cue);
    }
}
