impl<IN, T> BeaconApp<IN, T>
where
    IN: ButtonSource,
    T: Transport,
{
    pub fn with_screen<F>(&self, f: F)
    where
        F: FnOnce(Screen<'_>),
    {
        if self.online == Some(false) {
            let dots = (self.last_reconnect_slot.unwrap_or(0) % 4) as u8;
            f(Screen::Reconnecting {
                title: self.config.title,
                dots,
            });
            return;
        }

        let mut badge_buf = [0u8; BADGE_BYTES];
        let badge = self.badge(&mut badge_buf);
        let state = self.sync.state();

        f(Screen::Message {
            title: self.config.title,
            text: state.latest_message(),
            offset_px: self.presenter.offset_px(),
            provenance: state.provenance(),
            badge,
        });
    }

    fn badge<'a>(&self, buf: &'a mut [u8]) -> Option<Badge<'a>> {
        if self.remote_unseen {
            return Some(Badge {
                label: "NEW",
                tone: BadgeTone::Plain,
            });
        }

        match self.send_status {
            SendStatus::Idle => None,
            SendStatus::Delivered(code) => Some(Badge {
                label: status_code_label("SENT", code, buf),
                tone: BadgeTone::Plain,
            }),
            SendStatus::Rejected(code) => Some(Badge {
                label: status_code_label("ERR", code, buf),
                tone: BadgeTone::Alert,
            }),
            SendStatus::Failed => Some(Badge {
                label: "FAIL",
                tone: BadgeTone::Alert,
            }),
        }
    }

    pub fn drain_cue(&mut self) -> Option<Cue> {
        self.cues.pop_front()
    }

    pub fn sync_state(&self) -> &SyncState {
        self.sync.state()
    }

    pub fn scroll_offset_px(&self) -> i32 {
        self.presenter.offset_px()
    }

    pub fn scroll_direction(&self) -> ScrollDirection {
        self.presenter.direction()
    }

    pub fn send_status(&self) -> SendStatus {
        self.send_status
    }

    pub fn is_online(&self) -> bool {
        self.sync.is_online()
    }

    pub fn transport(&self) -> &T {
        self.sync.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.sync.transport_mut()
    }

    pub fn input_mut(&mut self) -> &mut IN {
        &mut self.input
    }
}
