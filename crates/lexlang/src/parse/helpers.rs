macro_rules! get_required_element {
    ($stream: expr, $doing: expr, $($pat:pat => $result:expr,)+) => {
        match ($stream).next()? {
            None => Err(crate::error::Error::missing_argument($doing)),
            Some(token) => match token.value() {
                $(
                    $pat => Ok($result),
                )+
                _ => {
                    ($stream).back(token);
                    Err(crate::error::Error::missing_argument($doing))
                }
            },
        }
    };
}

macro_rules! get_optional_element {
    ($stream: expr, $($pat:pat => $result:expr,)+) => {
        match ($stream).next()? {
            None => None,
            Some(token) => match token.value() {
                $(
                    $pat => Some($result),
                )+
                _ => {
                    ($stream).back(token);
                    None
                }
            },
        }
    };
}
