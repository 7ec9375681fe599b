use crate::path::Cell;
use crate::tower::TowerKind;
use crate::world::TowerId;

#[derive(Clone, Debug)]
pub enum PlayerAction {
    PlaceTower { cell: Cell, kind: TowerKind },
    UpgradeTower { id: TowerId },
    SellTower { id: TowerId },
    /// Skip the remaining inter-wave delay.
    StartWave,
    Pause,
    Resume,
    /// Tear the match down and rebuild it from config.
    Restart,
}
