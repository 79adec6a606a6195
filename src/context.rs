use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard};

use crate::asset::AssetFormatter;
use crate::directory::{FranchiseDirectory, PlayerDirectory};
use crate::usermap::UserMap;

/// State shared by the pollers and the command handler.
///
/// Guards must never be held across an `.await`. Lock order when more than
/// one is needed: franchises, players, users.
pub struct BotContext {
    season: u16,
    franchises: RwLock<FranchiseDirectory>,
    players: RwLock<PlayerDirectory>,
    users: Mutex<UserMap>,
}

impl BotContext {
    pub fn new(season: u16, users: UserMap) -> Self {
        Self {
            season,
            franchises: RwLock::new(FranchiseDirectory::new()),
            players: RwLock::new(PlayerDirectory::new()),
            users: Mutex::new(users),
        }
    }

    pub fn season(&self) -> u16 {
        self.season
    }

    pub fn franchises(&self) -> RwLockReadGuard<'_, FranchiseDirectory> {
        self.franchises.read()
    }

    pub fn players(&self) -> RwLockReadGuard<'_, PlayerDirectory> {
        self.players.read()
    }

    pub fn users(&self) -> MutexGuard<'_, UserMap> {
        self.users.lock()
    }

    pub fn merge_franchises(&self, dir: FranchiseDirectory) {
        self.franchises.write().merge(dir);
    }

    pub fn merge_players(&self, dir: PlayerDirectory) {
        self.players.write().merge(dir);
    }

    /// Run `f` with a formatter over the current directories and the user map.
    pub fn render<R>(&self, f: impl FnOnce(&AssetFormatter<'_>, &UserMap) -> R) -> R {
        let franchises = self.franchises.read();
        let players = self.players.read();
        let users = self.users.lock();
        let fmt = AssetFormatter::new(self.season, &franchises, &players);
        f(&fmt, &users)
    }
}
