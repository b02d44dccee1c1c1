/// Which line editor, if any, is capturing keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    GoToPage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Back,
    Tick,
    ScrollUp,
    ScrollDown,
    GoToTop,
    GoToBottom,
    Select,

    // Browse
    Load,
    NextPage,
    PreviousPage,
    GrowPageSize,
    ShrinkPageSize,
    Refresh,

    // Line input (search box, go-to-page prompt)
    BeginInput(InputMode),
    InputChar(char),
    InputBackspace,
    InputSubmit,
    InputCancel,
    ClearSearch,

    // Background work finished; re-read state
    ListUpdated,
    DetailUpdated,

    DismissError,
    OpenImage,

    None,
}
