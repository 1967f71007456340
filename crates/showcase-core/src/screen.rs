// Showcase screen
//
// Routes the controller overlay's gestures and the screen's focus changes
// to the tilt sound service. Long-pressing a hotspot toggles the selected
// car; a selection (re)starts the tilt session with that car's primary
// sound. Releasing the press, losing focus or dropping the screen stops it.

use std::path::PathBuf;

use showcase_sound::{AudioBackend, SensorSource, TiltSoundService};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::catalog::{CarId, CarRecord, Catalog};
use crate::prefs::Preferences;

pub struct ShowcaseScreen<A: AudioBackend, S: SensorSource> {
    service: TiltSoundService<A, S>,
    catalog: Catalog,
    prefs: Preferences,
    prefs_path: Option<PathBuf>,
    selected: Option<CarId>,
    tooltip: bool,
}

impl<A: AudioBackend, S: SensorSource> ShowcaseScreen<A, S> {
    /// Mount the screen. The first-launch tooltip shows only if the
    /// preferences have never recorded a launch.
    pub fn new(
        service: TiltSoundService<A, S>,
        catalog: Catalog,
        mut prefs: Preferences,
        prefs_path: Option<PathBuf>,
    ) -> Self {
        let tooltip = prefs.take_first_launch();
        let mut screen = Self {
            service,
            catalog,
            prefs,
            prefs_path,
            selected: None,
            tooltip,
        };
        if tooltip {
            screen.persist_prefs();
        }
        screen
    }

    /// Toggle the selection. Returns the car selected afterwards.
    pub fn long_press(&mut self, id: CarId) -> Option<CarId> {
        self.dismiss_tooltip();
        if self.selected == Some(id) {
            debug!("Deselected {id}");
            self.selected = None;
            self.service.stop();
            return None;
        }

        self.selected = Some(id);
        match self.catalog.get(id).and_then(CarRecord::primary_sound) {
            Some(asset) => {
                info!("Selected {id}, playing {asset}");
                // A different car may still be playing or loading.
                self.service.stop();
                self.service.start(asset.clone());
            }
            None => warn!("{id} has no sound to play"),
        }
        self.selected
    }

    /// End of a press gesture.
    pub fn press_out(&mut self) {
        if self.service.is_playing() {
            self.service.stop();
        }
    }

    /// Short press opens the car's detail view.
    pub fn press(&mut self, id: CarId) -> Option<&CarRecord> {
        self.dismiss_tooltip();
        self.catalog.get(id)
    }

    /// Full-volume preview of a car's sound, as played from its detail view.
    pub async fn preview(&self, id: CarId) -> bool {
        match self.catalog.get(id).and_then(CarRecord::primary_sound) {
            Some(asset) => self.service.play_full_volume(asset.clone()).await,
            None => false,
        }
    }

    pub fn focus(&mut self) {
        debug!("Showcase focused");
    }

    /// Losing focus always tears the session down.
    pub fn blur(&mut self) {
        debug!("Showcase lost focus");
        self.service.stop();
    }

    pub fn selected(&self) -> Option<CarId> {
        self.selected
    }

    pub fn tooltip_visible(&self) -> bool {
        self.tooltip
    }

    pub fn is_playing(&self) -> bool {
        self.service.is_playing()
    }

    pub fn volume(&self) -> watch::Receiver<f32> {
        self.service.volume()
    }

    pub fn service(&self) -> &TiltSoundService<A, S> {
        &self.service
    }

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    fn dismiss_tooltip(&mut self) {
        if !self.tooltip {
            return;
        }
        self.tooltip = false;
        self.prefs.is_first_loaded = true;
        self.persist_prefs();
    }

    fn persist_prefs(&self) {
        let Some(path) = &self.prefs_path else {
            return;
        };
        if let Err(e) = self.prefs.save_to(path) {
            warn!("Could not save preferences: {e:#}");
        }
    }
}
